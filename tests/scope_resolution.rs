//! Integration tests for scope resolution over parsed JavaScript
//!
//! Covers hoisting, lexical block scoping, property-name exclusion, usage lists and
//! the identifier partition invariant over randomly generated programs.

mod common;

use common::{analyze, idents, resolution};
use indoc::indoc;
use jsinsight::ir::index::Index;
use jsinsight::ir::js_node::NodeKind;
use jsinsight::ir::scope::{BindingKind, ScopeKind};
use jsinsight::parsers::javascript::parse_program;
use quickcheck::{QuickCheck, TestResult};
use test_utils::ir::generator::JsProgram;

#[test]
fn test_var_reference_before_declaration_is_hoisted() {
    let index = analyze("function f() { console.log(x); var x = 1; }");
    let resolution = resolution(&index);
    let xs = idents(&index, "x");
    assert_eq!(xs.len(), 2);

    let reference = resolution.binding_for_node(xs[0]).expect("forward reference resolves");
    let declaration = resolution.binding_for_node(xs[1]).expect("declaration has binding");
    assert_eq!(reference.id, declaration.id);
    assert_eq!(declaration.decl_node_id, xs[1]);
    assert_eq!(declaration.kind, BindingKind::Var);
    assert_eq!(resolution.scope(declaration.scope_id).map(|s| s.kind), Some(ScopeKind::Function));
}

#[test]
fn test_block_let_shadows_outer_let() {
    let index = analyze("let x = 1; { let x = 2; }");
    let resolution = resolution(&index);
    let xs = idents(&index, "x");
    assert_eq!(xs.len(), 2);

    let outer = resolution.binding_for_node(xs[0]).unwrap();
    let inner = resolution.binding_for_node(xs[1]).unwrap();
    assert_ne!(outer.id, inner.id);
    assert_eq!(outer.decl_node_id, xs[0]);
    assert_eq!(inner.decl_node_id, xs[1]);
    assert_eq!(resolution.scope(outer.scope_id).map(|s| s.kind), Some(ScopeKind::Global));
    assert_eq!(resolution.scope(inner.scope_id).map(|s| s.kind), Some(ScopeKind::Block));
}

#[test]
fn test_property_names_are_excluded() {
    let index = analyze("console.log(1);");
    let resolution = resolution(&index);
    let console = idents(&index, "console");
    let log = idents(&index, "log");

    assert!(resolution.is_unresolved(console[0]));
    assert!(resolution.binding_for_node(console[0]).is_none());
    assert!(resolution.binding_for_node(log[0]).is_none());
    assert!(!resolution.is_unresolved(log[0]));
}

#[test]
fn test_pattern_keys_fields_and_optional_chains_are_property_names() {
    let source = indoc! {r#"
        const {key: local, other} = source;
        class Widget {
          label = local;
          size;
        }
        local?.key;
    "#};
    let index = analyze(source);
    let resolution = resolution(&index);

    for name in ["key", "label", "size"] {
        for id in idents(&index, name) {
            assert!(is_property_name(&index, id), "{name}");
            assert!(resolution.binding_for_node(id).is_none(), "{name}");
            assert!(!resolution.is_unresolved(id), "{name}");
        }
    }
    let local = idents(&index, "local");
    assert_eq!(local.len(), 3);
    let binding = resolution.binding_for_node(local[0]).unwrap();
    assert_eq!(binding.kind, BindingKind::Const);
    assert_eq!(binding.references, local[1..].to_vec());
    assert!(resolution.binding_for_node(idents(&index, "other")[0]).is_some());
    assert!(resolution.is_unresolved(idents(&index, "source")[0]));
}

#[test]
fn test_all_usages_lists_declaration_first() {
    let source = indoc! {r#"
        const total = 0;
        function add(n) {
          return total + n;
        }
        add(total);
        total;
    "#};
    let index = analyze(source);
    let resolution = resolution(&index);
    for binding in &resolution.bindings {
        let usages = binding.all_usages();
        assert_eq!(usages.len(), 1 + binding.references.len());
        assert_eq!(usages[0], binding.decl_node_id);
    }

    let totals = idents(&index, "total");
    let total = resolution.binding_for_node(totals[0]).unwrap();
    assert_eq!(total.all_usages(), totals);
    assert_eq!(total.kind, BindingKind::Const);
}

#[test]
fn test_nested_functions_and_closures() {
    let source = indoc! {r#"
        function outer(a) {
          let count = a;
          const inc = (step) => { count = count + step; return count; };
          for (let i = 0; i < 3; i++) {
            inc(i);
          }
          try {
            inc(missing);
          } catch (err) {
            report(err);
          }
          return inc;
        }
    "#};
    let index = analyze(source);
    let resolution = resolution(&index);

    let counts = idents(&index, "count");
    let count = resolution.binding_for_node(counts[0]).unwrap();
    assert_eq!(count.kind, BindingKind::Let);
    assert_eq!(count.references.len(), counts.len() - 1);

    let is = idents(&index, "i");
    let i = resolution.binding_for_node(is[0]).unwrap();
    assert_eq!(resolution.scope(i.scope_id).map(|s| s.kind), Some(ScopeKind::For));
    assert_eq!(i.references.len(), 3);

    let errs = idents(&index, "err");
    let err = resolution.binding_for_node(errs[0]).unwrap();
    assert_eq!(err.kind, BindingKind::CatchParameter);
    assert_eq!(resolution.scope(err.scope_id).map(|s| s.kind), Some(ScopeKind::Catch));

    let unresolved: Vec<String> =
        resolution.unresolved.iter().filter_map(|id| index.text_of(*id)).collect();
    assert_eq!(unresolved, vec!["missing", "report"]);
}

#[test]
fn test_scope_at_offset_and_lookup() {
    let source = "let a = 1; function f(b) { { let c = b; } }";
    let index = analyze(source);
    let resolution = resolution(&index);

    let c = idents(&index, "c")[0];
    let offset = index.node(c).unwrap().start;
    let scope = resolution.scope_at_offset(offset).unwrap();
    assert_eq!(scope.kind, ScopeKind::Block);
    assert!(resolution.lookup(scope.id, "c").is_some());
    assert_eq!(resolution.lookup(scope.id, "b").map(|b| b.kind), Some(BindingKind::Parameter));
    assert_eq!(resolution.lookup(scope.id, "a").map(|b| b.kind), Some(BindingKind::Let));
    assert!(resolution.lookup(resolution.root_scope_id, "c").is_none());
}

/// True if `id` sits in a property-name position: the key of a `key: value` pair,
/// destructuring pair, method or class field, or the name after the dot (or `?.`) of a
/// member expression.
fn is_property_name(index: &Index, id: usize) -> bool {
    let Some(parent) = index.parent(id) else {
        return false;
    };
    match parent.kind {
        NodeKind::Property
        | NodeKind::MethodDefinition
        | NodeKind::PropertyPattern
        | NodeKind::FieldDefinition => parent.child_ids.first() == Some(&id),
        NodeKind::MemberExpression => parent.child_ids.last() == Some(&id),
        _ => false,
    }
}

#[test]
fn test_identifier_partition_property() {
    fn prop(program: JsProgram) -> TestResult {
        let code = program.to_code();
        let parsed = match parse_program(&code) {
            Ok(parsed) => parsed,
            Err(_) => return TestResult::failed(),
        };
        if parsed.has_errors() {
            return TestResult::discard();
        }
        let index = analyze(&code);
        let resolution = resolution(&index);

        for node in index.iter().filter(|n| n.kind == NodeKind::Identifier) {
            let bound = resolution.binding_for_node(node.id).is_some();
            let unresolved = resolution.is_unresolved(node.id);
            let property = is_property_name(&index, node.id);
            let buckets = [bound, unresolved, property].iter().filter(|b| **b).count();
            if buckets != 1 {
                eprintln!("identifier {:?} in {} buckets:\n{}", node.name, buckets, code);
                return TestResult::failed();
            }
            if let Some(binding) = resolution.binding_for_node(node.id) {
                if node.name.as_deref() != Some(binding.name.as_str()) {
                    return TestResult::failed();
                }
            }
        }
        for binding in &resolution.bindings {
            let sorted = binding.references.windows(2).all(|w| {
                let a = index.node(w[0]).map(|n| n.start);
                let b = index.node(w[1]).map(|n| n.start);
                a < b
            });
            if !sorted {
                return TestResult::failed();
            }
        }
        TestResult::passed()
    }

    QuickCheck::new().tests(300).max_tests(3000).quickcheck(prop as fn(JsProgram) -> TestResult);
}
