//! Candidate resolution for a completion context
//!
//! Property contexts answer from the built-in tables or from the initializer of a
//! global binding; identifier contexts list global bindings and well-known globals.
//! An optional secondary snapshot (an unsaved buffer) contributes the names it
//! declares. Results are de-duplicated by label and prefix-filtered.

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::ir::index::{Index, NodeRecord};
use crate::ir::js_node::NodeKind;
use crate::ir::scope::{BindingKind, BindingRecord};
use crate::snapshot::SnapshotNode;

use super::builtins;
use super::context::{CompletionContext, ContextKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateKind {
    Property,
    Method,
    Variable,
    Function,
    Keyword,
}

impl CandidateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateKind::Property => "property",
            CandidateKind::Method => "method",
            CandidateKind::Variable => "variable",
            CandidateKind::Function => "function",
            CandidateKind::Keyword => "keyword",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCandidate {
    pub label: String,
    pub kind: CandidateKind,
    /// Short origin or type hint.
    pub detail: String,
}

impl CompletionCandidate {
    pub fn new(label: impl Into<String>, kind: CandidateKind, detail: impl Into<String>) -> Self {
        Self { label: label.into(), kind, detail: detail.into() }
    }
}

/// Candidates for `ctx`, filtered by its typed prefix.
pub fn resolve_candidates(
    ctx: &CompletionContext,
    index: &Index,
    secondary: Option<&SnapshotNode>,
) -> Vec<CompletionCandidate> {
    let mut candidates = match ctx.kind {
        ContextKind::None => return Vec::new(),
        ContextKind::Property => property_candidates(ctx.base_expr.trim(), index),
        ContextKind::Identifier | ContextKind::Argument => identifier_candidates(index),
    };
    if let Some(buffer) = secondary {
        candidates.extend(declared_in_snapshot(buffer));
    }

    let prefix = ctx.partial_text.to_lowercase();
    let mut seen = FxHashSet::default();
    candidates.retain(|c| seen.insert(c.label.clone()) && c.label.to_lowercase().starts_with(&prefix));
    debug!(
        "{} candidates for {} context (base={:?}, prefix={:?})",
        candidates.len(),
        ctx.kind.as_str(),
        ctx.base_expr,
        ctx.partial_text
    );
    candidates
}

fn property_candidates(base: &str, index: &Index) -> Vec<CompletionCandidate> {
    let mut candidates = match builtins::global_members(base) {
        Some(members) => members,
        None => global_binding(index, base)
            .and_then(|binding| initializer(index, binding))
            .map(|init| shape_members(index, init))
            .unwrap_or_default(),
    };
    candidates.extend(builtins::object_floor());
    candidates
}

fn identifier_candidates(index: &Index) -> Vec<CompletionCandidate> {
    let mut candidates = Vec::new();
    if let Some(resolution) = index.resolution() {
        for binding in resolution.global_bindings() {
            let callable = binding.kind == BindingKind::Function
                || initializer(index, binding).is_some_and(|init| {
                    matches!(init.kind, NodeKind::FunctionExpression | NodeKind::ArrowFunction)
                });
            let kind = if callable { CandidateKind::Function } else { CandidateKind::Variable };
            candidates.push(CompletionCandidate::new(&binding.name, kind, binding.kind.as_str()));
        }
    }
    candidates.extend(builtins::well_known_globals());
    candidates
}

fn global_binding<'a>(index: &'a Index, name: &str) -> Option<&'a BindingRecord> {
    let resolution = index.resolution()?;
    let scope = resolution.global_scope()?;
    scope.bindings.get(name).and_then(|id| resolution.binding(*id))
}

/// Initializer of `const name = init`, found next to the declaring identifier.
fn initializer<'a>(index: &'a Index, binding: &BindingRecord) -> Option<&'a NodeRecord> {
    let declarator = index.parent(binding.decl_node_id)?;
    if declarator.kind != NodeKind::VariableDeclarator {
        return None;
    }
    match declarator.child_ids.as_slice() {
        [name, init, ..] if *name == binding.decl_node_id => index.node(*init),
        _ => None,
    }
}

/// Members implied by the shape of an initializer.
fn shape_members(index: &Index, init: &NodeRecord) -> Vec<CompletionCandidate> {
    match init.kind {
        NodeKind::ObjectLiteral => object_keys(index, init),
        NodeKind::ArrayLiteral => builtins::array_methods(),
        _ => Vec::new(),
    }
}

fn object_keys(index: &Index, object: &NodeRecord) -> Vec<CompletionCandidate> {
    let mut keys = Vec::new();
    for member in index.children(object.id) {
        let (key, kind) = match member.kind {
            // Shorthand `{x}`
            NodeKind::Identifier => (Some(member), CandidateKind::Property),
            NodeKind::Property => (index.children(member.id).first().copied(), property_kind(index, member)),
            NodeKind::MethodDefinition => (index.children(member.id).first().copied(), CandidateKind::Method),
            _ => (None, CandidateKind::Property),
        };
        let Some(key) = key else { continue };
        if is_computed_key(index, member, key) {
            trace!("Skipping computed key at {}", key.start);
            continue;
        }
        if let Some(name) = &key.name {
            keys.push(CompletionCandidate::new(name, kind, "property"));
        }
    }
    keys
}

fn property_kind(index: &Index, property: &NodeRecord) -> CandidateKind {
    let value = index.children(property.id).get(1).map(|v| v.kind);
    match value {
        Some(NodeKind::FunctionExpression | NodeKind::ArrowFunction) => CandidateKind::Method,
        _ => CandidateKind::Property,
    }
}

/// `[expr]: value` keys are expressions, not names.
fn is_computed_key(index: &Index, member: &NodeRecord, key: &NodeRecord) -> bool {
    if member.id == key.id {
        return false;
    }
    let Some(text) = index.text_of(member.id) else { return false };
    let offset = key.start.saturating_sub(member.start) as usize;
    text.get(..offset).is_some_and(|head| head.trim_end().ends_with('['))
}

/// Variable, function and class names declared anywhere in a snapshot.
pub fn declared_in_snapshot(root: &SnapshotNode) -> Vec<CompletionCandidate> {
    let mut names = Vec::new();
    for node in root.walk() {
        let kind = match node.kind.as_str() {
            "variable_declarator" => CandidateKind::Variable,
            "function_declaration" | "generator_function_declaration" => CandidateKind::Function,
            "class_declaration" => CandidateKind::Variable,
            _ => continue,
        };
        let name = node.children.first().filter(|c| c.kind == "identifier" && !c.is_missing);
        if let Some(text) = name.and_then(|n| n.text.as_deref()) {
            names.push(CompletionCandidate::new(text, kind, "buffer"));
        } else if kind == CandidateKind::Function || node.kind == "class_declaration" {
            // `function` / `class` keywords come first.
            let named = node.children.iter().find(|c| c.kind == "identifier" && !c.is_missing);
            if let Some(text) = named.and_then(|n| n.text.as_deref()) {
                names.push(CompletionCandidate::new(text, kind, "buffer"));
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::index::build_index;
    use crate::ir::transforms::scope_resolver::resolve;
    use crate::parsers::javascript::parse_program;
    use crate::snapshot::SnapshotParser;

    fn indexed(source: &str) -> Index {
        let parsed = parse_program(source).unwrap();
        let mut index = build_index(&parsed.program, source);
        let resolution = resolve(&parsed.program, &index);
        index.attach_resolution(resolution);
        index
    }

    fn ctx(kind: ContextKind, base: &str, partial: &str) -> CompletionContext {
        CompletionContext {
            kind,
            base_expr: base.to_string(),
            base_node_kind: String::new(),
            partial_text: partial.to_string(),
            cursor_row: 0,
            cursor_col: 0,
        }
    }

    fn labels(candidates: &[CompletionCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn test_object_literal_keys() {
        let index = indexed("const obj = { foo: 1, bar() {}, baz, [k]: 2, 'q': 3 };");
        let out = resolve_candidates(&ctx(ContextKind::Property, "obj", ""), &index, None);
        assert_eq!(labels(&out), vec!["foo", "bar", "baz", "q", "hasOwnProperty", "toString", "valueOf"]);
        assert_eq!(out[1].kind, CandidateKind::Method);
    }

    #[test]
    fn test_array_binding_gets_array_methods() {
        let index = indexed("let xs = [1, 2, 3];");
        let out = resolve_candidates(&ctx(ContextKind::Property, "xs", "ma"), &index, None);
        assert_eq!(labels(&out), vec!["map"]);
    }

    #[test]
    fn test_unknown_base_keeps_floor() {
        let index = indexed("let n = 5;");
        let out = resolve_candidates(&ctx(ContextKind::Property, "mystery", ""), &index, None);
        assert_eq!(labels(&out), vec!["hasOwnProperty", "toString", "valueOf"]);
    }

    #[test]
    fn test_identifier_candidates_are_global_only() {
        let index = indexed("function greet() { let inner = 1; } const total = () => 0; var count;");
        let out = resolve_candidates(&ctx(ContextKind::Identifier, "", ""), &index, None);
        let names = labels(&out);
        assert!(names.contains(&"greet"));
        assert!(names.contains(&"count"));
        assert!(names.contains(&"console"));
        assert!(!names.contains(&"inner"));
        let total = out.iter().find(|c| c.label == "total").unwrap();
        assert_eq!(total.kind, CandidateKind::Function);
    }

    #[test]
    fn test_prefix_filter_is_case_insensitive() {
        let index = indexed("var Counter = 0; var cache;");
        let out = resolve_candidates(&ctx(ContextKind::Identifier, "", "C"), &index, None);
        let names = labels(&out);
        assert!(names.contains(&"Counter"));
        assert!(names.contains(&"cache"));
        assert!(names.contains(&"console"));
        assert!(!names.contains(&"Math"));
    }

    #[test]
    fn test_secondary_snapshot_names_are_appended() {
        let index = indexed("var a;");
        let buffer = SnapshotParser::new().unwrap().parse(b"let draft = 1; function helper() {} var a;").unwrap();
        let out = resolve_candidates(&ctx(ContextKind::Identifier, "", ""), &index, Some(&buffer));
        let names = labels(&out);
        assert!(names.contains(&"draft"));
        assert!(names.contains(&"helper"));
        assert_eq!(names.iter().filter(|n| **n == "a").count(), 1);
    }

    #[test]
    fn test_none_context_has_no_candidates() {
        let index = indexed("x;");
        assert!(resolve_candidates(&ctx(ContextKind::None, "", ""), &index, None).is_empty());
    }
}
