//! CST snapshots and their S-expression rendering.

mod common;

use common::analyze;
use indoc::indoc;
use jsinsight::ir::transforms::sexpr_printer::{SexprOptions, format_index, format_snapshot};
use jsinsight::snapshot::SnapshotParser;
use quickcheck::{QuickCheck, TestResult};
use test_utils::ir::generator::JsProgram;

#[test]
fn test_error_recovery_is_visible() {
    let source = indoc! {r#"
        function broken( {
          return 1;
        }
    "#};
    let root = SnapshotParser::new().unwrap().parse(source.as_bytes()).unwrap();
    assert!(root.has_error());
    let rendered = format_snapshot(&root, &SexprOptions::default());
    assert!(rendered.contains(":error") || rendered.contains(":missing"), "{rendered}");
}

#[test]
fn test_depth_three_tree_truncates_at_depth_one() {
    // program > expression_statement > call_expression > ...
    let index = analyze("f(1);");
    let options = SexprOptions { max_depth: Some(1), ..Default::default() };
    let rendered = format_index(&index, &options);
    assert!(rendered.contains("(...)"), "{rendered}");

    let root = SnapshotParser::new().unwrap().parse(b"f(1);").unwrap();
    let rendered = format_snapshot(&root, &options);
    assert!(rendered.contains("(...)"), "{rendered}");
}

#[test]
fn test_node_budget_stops_output() {
    let index = analyze("let a = 1; let b = 2; let c = 3;");
    let options = SexprOptions { max_nodes: Some(3), compact: true, ..Default::default() };
    let rendered = format_index(&index, &options);
    assert_eq!(rendered.matches("(...)").count(), 1, "{rendered}");
    let full = format_index(&index, &SexprOptions { compact: true, ..Default::default() });
    assert!(!full.contains("(...)"));
}

#[test]
fn test_snapshot_positions_match_index() {
    let source = "let first = 1;\nlet second = first;";
    let index = analyze(source);
    let root = SnapshotParser::new().unwrap().parse(source.as_bytes()).unwrap();

    let leaf = root.node_at_position(1, 13).unwrap();
    assert_eq!(leaf.text.as_deref(), Some("first"));
    // 1-based offset of the same byte.
    let offset = leaf.start_byte as u32 + 1;
    let node = index.node_at_offset(offset).unwrap();
    assert_eq!(node.name.as_deref(), Some("first"));
    assert_eq!((node.start_line, node.start_col), (leaf.start_row + 1, leaf.start_col + 1));
}

#[test]
fn test_leaf_text_reassembles_source_property() {
    fn prop(program: JsProgram) -> TestResult {
        let code = program.to_code();
        let Some(root) = SnapshotParser::new().ok().and_then(|mut p| p.parse(code.as_bytes())) else {
            return TestResult::failed();
        };
        if root.has_error() {
            return TestResult::discard();
        }
        let expected: String = code.chars().filter(|c| !c.is_whitespace()).collect();
        let actual: String = root.leaf_text().chars().filter(|c| !c.is_whitespace()).collect();
        if expected != actual {
            eprintln!("expected {expected}\nactual   {actual}");
            return TestResult::failed();
        }
        let contained = root.walk().all(|node| {
            node.children.iter().all(|c| node.start() <= c.start() && c.end() <= node.end())
        });
        TestResult::from_bool(contained)
    }

    QuickCheck::new().tests(200).max_tests(2000).quickcheck(prop as fn(JsProgram) -> TestResult);
}
