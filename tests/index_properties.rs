//! Integration tests for the AST index: containment queries, position conversion
//! and structural invariants over fixtures and generated programs.

mod common;

use common::{analyze, idents};
use indoc::indoc;
use jsinsight::ir::js_node::NodeKind;
use jsinsight::parsers::javascript::parse_program;
use jsinsight::snapshot::SnapshotParser;
use quickcheck::{QuickCheck, TestResult};
use test_utils::ir::generator::JsProgram;

#[test]
fn test_fixture_structure() {
    let source = indoc! {r#"
        const greeting = "hi";
        function greet(name) {
          return greeting + name;
        }
    "#};
    let index = analyze(source);
    let root = index.node(index.root_id().unwrap()).unwrap();
    assert_eq!(root.kind, NodeKind::Program);
    assert_eq!(root.depth, 0);
    assert!(root.is_root());

    for node in index.iter() {
        assert!(node.start <= node.end, "{:?}", node);
        if let Some(parent) = index.parent(node.id) {
            assert!(parent.start <= node.start && node.end <= parent.end);
            assert_eq!(node.depth, parent.depth + 1);
            assert!(parent.child_ids.contains(&node.id));
        }
    }

    // Offset of `name` inside the return statement.
    let offset = source.rfind("name").unwrap() as u32 + 1;
    let node = index.node_at_offset(offset).unwrap();
    assert_eq!(node.kind, NodeKind::Identifier);
    assert_eq!(node.name.as_deref(), Some("name"));
    let path: Vec<NodeKind> =
        index.ancestor_path(node.id).iter().filter_map(|id| index.node(*id)).map(|n| n.kind).collect();
    assert_eq!(path.first(), Some(&NodeKind::Program));
    assert!(path.contains(&NodeKind::FunctionDeclaration));
    assert!(path.contains(&NodeKind::ReturnStatement));
}

#[test]
fn test_line_col_on_multiline_source() {
    let index = analyze("let a = 1;\nlet b = 2;\n");
    assert_eq!(index.offset_to_line_col(1), (1, 1));
    assert_eq!(index.offset_to_line_col(12), (2, 1));
    assert_eq!(index.line_col_to_offset(2, 5), Some(16));
    assert_eq!(index.line_col_to_offset(9, 1), None);
    let b = index.node_at_offset(16).unwrap();
    assert_eq!(b.name.as_deref(), Some("b"));
    assert_eq!((b.start_line, b.start_col), (2, 5));
}

#[test]
fn test_only_line_feed_breaks_lines() {
    let sources = [
        "let a = 1;\x0Clet b = 2;",
        "let a = 1;\x0Blet b = 2;",
        "let a = 1;\rlet b = 2;",
        "let s = \"x\u{85}y\"; let b = 2;",
        "let a = 1;\r\nlet b = 2;",
    ];
    for source in sources {
        let index = analyze(source);
        let root = SnapshotParser::new().unwrap().parse(source.as_bytes()).unwrap();
        let leaf = root
            .walk()
            .find(|n| n.kind == "identifier" && n.text.as_deref() == Some("b"))
            .expect("identifier b in snapshot");
        let expected = (leaf.start_row + 1, leaf.start_col + 1);

        let node = index.node(idents(&index, "b")[0]).unwrap();
        assert_eq!((node.start_line, node.start_col), expected, "{source:?}");
        assert_eq!(index.offset_to_line_col(node.start), expected, "{source:?}");
        assert_eq!(index.line_col_to_offset(expected.0, expected.1), Some(node.start), "{source:?}");
    }

    let index = analyze("let a = 1;\x0Clet b = 2;");
    let b = index.node(idents(&index, "b")[0]).unwrap();
    assert_eq!((b.start_line, b.start_col), (1, 16));
}

#[test]
fn test_containment_property() {
    fn prop(program: JsProgram) -> TestResult {
        let code = program.to_code();
        let Ok(parsed) = parse_program(&code) else {
            return TestResult::failed();
        };
        if parsed.has_errors() {
            return TestResult::discard();
        }
        let index = analyze(&code);
        for node in index.iter() {
            for offset in node.start..node.end {
                let Some(found) = index.node_at_offset(offset) else {
                    return TestResult::failed();
                };
                if found.start < node.start || found.end > node.end {
                    eprintln!("offset {} of {:?} found {:?} in:\n{}", offset, node, found, code);
                    return TestResult::failed();
                }
            }
        }
        TestResult::passed()
    }

    QuickCheck::new().tests(200).max_tests(2000).quickcheck(prop as fn(JsProgram) -> TestResult);
}

#[test]
fn test_line_col_round_trip_property() {
    fn prop(program: JsProgram) -> TestResult {
        let code = program.to_code();
        let index = analyze(&code);
        for offset in 1..=code.len() as u32 + 1 {
            let (line, col) = index.offset_to_line_col(offset);
            if index.line_col_to_offset(line, col) != Some(offset) {
                eprintln!("offset {} -> ({}, {}) in:\n{}", offset, line, col, code);
                return TestResult::failed();
            }
        }
        TestResult::passed()
    }

    QuickCheck::new().tests(200).quickcheck(prop as fn(JsProgram) -> TestResult);
}

#[test]
fn test_ids_are_dense_and_labels_present() {
    fn prop(program: JsProgram) -> bool {
        let code = program.to_code();
        if parse_program(&code).map_or(true, |parsed| parsed.has_errors()) {
            return true;
        }
        let index = analyze(&code);
        index.iter().count() == index.len()
            && index.iter().enumerate().all(|(i, node)| node.id == i)
            && index
                .iter()
                .filter(|n| n.kind == NodeKind::Identifier)
                .all(|n| n.name.as_deref().is_some_and(|name| !name.is_empty()))
    }

    QuickCheck::new().tests(200).quickcheck(prop as fn(JsProgram) -> bool);
}
