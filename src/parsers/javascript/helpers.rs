//! Helper functions for JavaScript Tree-Sitter lowering
//!
//! Small, allocation-light utilities shared by the statement, expression and
//! pattern lowering passes.

use tree_sitter::Node as TSNode;

use crate::ir::js_node::Span;

/// 1-based AST span of a CST node. MISSING tokens get the degenerate span.
pub(crate) fn span_of(node: TSNode) -> Span {
    if node.is_missing() {
        return Span::default();
    }
    Span::new(node.start_byte() as u32 + 1, node.end_byte() as u32 + 1)
}

/// Span from the start of `first` to the end of `last`, ignoring degenerate ends.
pub(crate) fn span_between(first: Span, last: Span) -> Span {
    first.cover(last)
}

/// Source text of a node, or the empty string for out-of-range or MISSING nodes.
pub(crate) fn node_text<'a>(node: TSNode, source: &'a str) -> &'a str {
    if node.is_missing() {
        return "";
    }
    source.get(node.byte_range()).unwrap_or("")
}

pub(crate) fn is_comment(node: TSNode) -> bool {
    matches!(node.kind(), "comment" | "html_comment")
}

/// Named children with comments filtered out.
pub(crate) fn named_children(node: TSNode) -> Vec<TSNode> {
    let mut cursor = node.walk();
    let children = node.named_children(&mut cursor).filter(|child| !is_comment(*child)).collect();
    children
}

/// First named, non-comment child.
pub(crate) fn first_named(node: TSNode) -> Option<TSNode> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|child| !is_comment(*child));
    found
}

/// All children paired with the grammar field they occupy, in source order.
///
/// Fields declared over a `seq(...)` tag every node in the sequence, punctuation
/// included, so callers must tolerate anonymous tokens under a field name.
pub(crate) fn fielded_children(node: TSNode) -> Vec<(Option<&'static str>, TSNode)> {
    let mut out = Vec::with_capacity(node.child_count());
    let mut cursor = node.walk();
    if !cursor.goto_first_child() {
        return out;
    }
    loop {
        out.push((cursor.field_name(), cursor.node()));
        if !cursor.goto_next_sibling() {
            break;
        }
    }
    out
}

/// First anonymous child token whose kind is one of `tokens`.
pub(crate) fn token_child<'t>(node: TSNode<'t>, tokens: &[&str]) -> Option<TSNode<'t>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| !child.is_named() && tokens.contains(&child.kind()));
    found
}

pub(crate) fn has_token(node: TSNode, token: &str) -> bool {
    token_child(node, &[token]).is_some()
}

/// CST kinds lowered through the statement path rather than the expression path.
pub(crate) fn is_statement_kind(kind: &str) -> bool {
    matches!(
        kind,
        "expression_statement"
            | "variable_declaration"
            | "lexical_declaration"
            | "function_declaration"
            | "generator_function_declaration"
            | "class_declaration"
            | "statement_block"
            | "if_statement"
            | "switch_statement"
            | "for_statement"
            | "for_in_statement"
            | "while_statement"
            | "do_statement"
            | "try_statement"
            | "with_statement"
            | "break_statement"
            | "continue_statement"
            | "return_statement"
            | "throw_statement"
            | "empty_statement"
            | "debugger_statement"
            | "labeled_statement"
            | "import_statement"
            | "export_statement"
    )
}
