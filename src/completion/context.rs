//! Completion context detection over a CST snapshot
//!
//! The cursor is classified by looking at the snapshot node under it (and one column
//! to the left, since editors report the cursor just past the last typed character):
//!
//! 1. a property name under a member expression: `obj.pa|`
//! 2. a trailing `.` with nothing after it, as produced by error recovery: `obj.|`
//! 3. a bare identifier: `fo|`
//! 4. an opening paren or comma in an argument list: `f(|`
//!
//! Anything else yields [`ContextKind::None`].

use tracing::{debug, trace};

use crate::snapshot::SnapshotNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    None,
    Property,
    Identifier,
    Argument,
}

impl ContextKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextKind::None => "none",
            ContextKind::Property => "property",
            ContextKind::Identifier => "identifier",
            ContextKind::Argument => "argument",
        }
    }
}

/// Result of [`extract_context`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionContext {
    pub kind: ContextKind,
    /// Source of the expression left of the dot (property), or the callee (argument).
    pub base_expr: String,
    /// CST kind of the base expression; empty when there is none.
    pub base_node_kind: String,
    /// Prefix already typed.
    pub partial_text: String,
    pub cursor_row: usize,
    pub cursor_col: usize,
}

impl CompletionContext {
    pub fn none(cursor_row: usize, cursor_col: usize) -> Self {
        Self {
            kind: ContextKind::None,
            base_expr: String::new(),
            base_node_kind: String::new(),
            partial_text: String::new(),
            cursor_row,
            cursor_col,
        }
    }

    pub fn is_none(&self) -> bool {
        self.kind == ContextKind::None
    }

    fn with(
        kind: ContextKind,
        base: Option<&SnapshotNode>,
        partial_text: String,
        cursor_row: usize,
        cursor_col: usize,
    ) -> Self {
        Self {
            kind,
            base_expr: base.map(node_source).unwrap_or_default(),
            base_node_kind: base.map(|b| b.kind.clone()).unwrap_or_default(),
            partial_text,
            cursor_row,
            cursor_col,
        }
    }
}

const MEMBER_EXPRESSION: &str = "member_expression";
const SEPARATORS: &[&str] = &[".", "?.", "optional_chain"];

fn is_separator(node: &SnapshotNode) -> bool {
    SEPARATORS.contains(&node.kind.as_str())
}

fn is_comment(node: &SnapshotNode) -> bool {
    node.kind == "comment"
}

/// Leaf text as-is; interior nodes are rebuilt from their leaves.
fn node_source(node: &SnapshotNode) -> String {
    match &node.text {
        Some(text) => text.clone(),
        None => node.leaf_text(),
    }
}

/// Text of `token` typed before the cursor; the whole token if the cursor is past it.
fn typed_prefix(token: &SnapshotNode, row: usize, col: usize) -> String {
    let text = token.text.clone().unwrap_or_default();
    if token.start_row != row || token.end_row != row || col >= token.end_col {
        return text;
    }
    let cut = col.saturating_sub(token.start_col);
    text.get(..cut).map(str::to_string).unwrap_or(text)
}

/// Classifies the cursor at 0-based `(row, col)`.
///
/// `source` is only used to log a short excerpt; positions come from `root`.
pub fn extract_context(root: &SnapshotNode, source: &str, row: usize, col: usize) -> CompletionContext {
    let mut points = vec![(row, col)];
    if col > 0 {
        points.push((row, col - 1));
    }
    for (r, c) in points {
        let Some(node) = root.node_at_position(r, c) else {
            trace!("No snapshot node at {}:{}", r, c);
            continue;
        };
        let Some(path) = root.path_to(node) else { continue };
        if let Some(context) = classify(&path, row, col) {
            debug!(
                "Completion context {} at {}:{} (base={:?}, partial={:?}, line={:?})",
                context.kind.as_str(),
                row,
                col,
                context.base_expr,
                context.partial_text,
                source.lines().nth(row).unwrap_or_default()
            );
            return context;
        }
    }
    CompletionContext::none(row, col)
}

fn classify(path: &[&SnapshotNode], row: usize, col: usize) -> Option<CompletionContext> {
    property_name(path, row, col)
        .or_else(|| trailing_separator(path, row, col))
        .or_else(|| bare_identifier(path, row, col))
        .or_else(|| argument_position(path, row, col))
}

/// `obj.pa|`: a property-name token under a member expression.
fn property_name(path: &[&SnapshotNode], row: usize, col: usize) -> Option<CompletionContext> {
    let node = *path.last()?;
    if !matches!(node.kind.as_str(), "property_identifier" | "private_property_identifier") {
        return None;
    }
    if path.len() < 2 {
        return None;
    }
    // Only the property slot of the enclosing member expression counts; keys of
    // object literals nested in a member chain do not.
    let member = path[path.len() - 2];
    if member.kind != MEMBER_EXPRESSION {
        return None;
    }
    let mut parts = member.children.iter().filter(|c| !is_comment(c));
    let base = parts.next().filter(|c| !is_separator(c))?;
    if !parts.last().is_some_and(|last| std::ptr::eq(last, node)) {
        return None;
    }
    Some(CompletionContext::with(
        ContextKind::Property,
        Some(base),
        typed_prefix(node, row, col),
        row,
        col,
    ))
}

/// `obj.|`: error recovery leaves a dangling separator.
///
/// Accepts a member expression whose property is a MISSING token, an error node whose
/// last child is the separator (base is the child before it), and an error node that
/// starts with the separator (base is the error node's previous sibling).
fn trailing_separator(path: &[&SnapshotNode], row: usize, col: usize) -> Option<CompletionContext> {
    let property = |base: &SnapshotNode| {
        Some(CompletionContext::with(ContextKind::Property, Some(base), String::new(), row, col))
    };
    for (depth, node) in path.iter().enumerate().rev() {
        let children: Vec<&SnapshotNode> = node.children.iter().filter(|c| !is_comment(c)).collect();

        if node.kind == MEMBER_EXPRESSION {
            let separator = match children.last() {
                Some(last) if last.is_missing => children.iter().rev().nth(1).copied(),
                Some(last) => Some(*last),
                None => None,
            };
            if separator.is_some_and(|sep| is_separator(sep) && ends_at_cursor(sep, row, col)) {
                if let Some(base) = children.first().copied().filter(|c| !is_separator(c)) {
                    return property(base);
                }
            }
            continue;
        }

        if !node.is_error {
            continue;
        }
        if let Some(position) = children.iter().rposition(|c| is_separator(c)) {
            if position + 1 == children.len() && position > 0 && ends_at_cursor(children[position], row, col) {
                return property(children[position - 1]);
            }
        }
        if children.first().is_some_and(|c| is_separator(c) && ends_at_cursor(c, row, col)) && depth > 0 {
            let parent = path[depth - 1];
            let index = parent.children.iter().position(|c| std::ptr::eq(c, *node))?;
            let previous = parent.children[..index].iter().rev().find(|c| !is_comment(c))?;
            return property(previous);
        }
    }
    None
}

/// True if `separator` ends on the cursor row at the cursor or one column before it.
fn ends_at_cursor(separator: &SnapshotNode, row: usize, col: usize) -> bool {
    separator.end_row == row && separator.end_col <= col && col - separator.end_col <= 1
}

/// `fo|`: a bare identifier.
fn bare_identifier(path: &[&SnapshotNode], row: usize, col: usize) -> Option<CompletionContext> {
    let node = *path.last()?;
    if node.kind != "identifier" || node.is_missing {
        return None;
    }
    Some(CompletionContext::with(ContextKind::Identifier, None, typed_prefix(node, row, col), row, col))
}

/// `f(|` or `f(a,|`: an argument slot of a call.
fn argument_position(path: &[&SnapshotNode], row: usize, col: usize) -> Option<CompletionContext> {
    let node = *path.last()?;
    if !matches!(node.kind.as_str(), "(" | ",") || path.len() < 3 {
        return None;
    }
    let arguments = path[path.len() - 2];
    if arguments.kind != "arguments" {
        return None;
    }
    let call = path[path.len() - 3];
    let callee = call.children.first().filter(|c| !std::ptr::eq(*c, arguments))?;
    Some(CompletionContext::with(ContextKind::Argument, Some(callee), String::new(), row, col))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotParser;

    fn context(source: &str, row: usize, col: usize) -> CompletionContext {
        let root = SnapshotParser::new().unwrap().parse(source.as_bytes()).unwrap();
        extract_context(&root, source, row, col)
    }

    #[test]
    fn test_dangling_dot_is_property() {
        let ctx = context("console.", 0, 8);
        assert_eq!(ctx.kind, ContextKind::Property);
        assert_eq!(ctx.base_expr, "console");
        assert_eq!(ctx.partial_text, "");
    }

    #[test]
    fn test_partial_property() {
        let ctx = context("console.lo", 0, 10);
        assert_eq!(ctx.kind, ContextKind::Property);
        assert_eq!(ctx.base_expr, "console");
        assert_eq!(ctx.base_node_kind, "identifier");
        assert_eq!(ctx.partial_text, "lo");
    }

    #[test]
    fn test_cursor_inside_property_uses_typed_prefix() {
        let ctx = context("console.log", 0, 10);
        assert_eq!(ctx.partial_text, "lo");
    }

    #[test]
    fn test_nested_base_is_rebuilt_from_leaves() {
        let ctx = context("a.b.c", 0, 5);
        assert_eq!(ctx.kind, ContextKind::Property);
        assert_eq!(ctx.base_expr, "a.b");
        assert_eq!(ctx.base_node_kind, "member_expression");
    }

    #[test]
    fn test_bare_identifier() {
        let ctx = context("let x = 1;\nfo", 1, 2);
        assert_eq!(ctx.kind, ContextKind::Identifier);
        assert_eq!(ctx.partial_text, "fo");
        assert_eq!((ctx.cursor_row, ctx.cursor_col), (1, 2));
    }

    #[test]
    fn test_number_has_no_context() {
        assert!(context("42", 0, 2).is_none());
    }

    #[test]
    fn test_call_argument_slot() {
        let ctx = context("print(a, )", 0, 8);
        assert_eq!(ctx.kind, ContextKind::Argument);
        assert_eq!(ctx.base_expr, "print");
    }

    #[test]
    fn test_object_key_in_member_chain_is_not_property() {
        let ctx = context("fetch({method: 'GET'}).then(r);", 0, 13);
        assert_ne!(ctx.kind, ContextKind::Property);
        assert!(ctx.is_none());
    }

    #[test]
    fn test_property_after_chained_call() {
        let ctx = context("fetch({method: 'GET'}).th", 0, 25);
        assert_eq!(ctx.kind, ContextKind::Property);
        assert_eq!(ctx.base_expr, "fetch({method:'GET'})");
        assert_eq!(ctx.partial_text, "th");
    }

    #[test]
    fn test_optional_chain_property() {
        let ctx = context("user?.na", 0, 8);
        assert_eq!(ctx.kind, ContextKind::Property);
        assert_eq!(ctx.base_expr, "user");
        assert_eq!(ctx.partial_text, "na");
    }

    fn leaf(kind: &str, text: &str, start_col: usize) -> SnapshotNode {
        let end_col = start_col + text.len();
        SnapshotNode {
            kind: kind.to_string(),
            text: Some(text.to_string()),
            start_row: 0,
            start_col,
            end_row: 0,
            end_col,
            start_byte: start_col,
            end_byte: end_col,
            is_error: false,
            is_missing: false,
            children: Vec::new(),
        }
    }

    fn interior(kind: &str, is_error: bool, children: Vec<SnapshotNode>) -> SnapshotNode {
        let first = children.first().map_or(0, |c| c.start_col);
        let last = children.last().map_or(0, |c| c.end_col);
        SnapshotNode {
            kind: kind.to_string(),
            text: None,
            start_row: 0,
            start_col: first,
            end_row: 0,
            end_col: last,
            start_byte: first,
            end_byte: last,
            is_error,
            is_missing: false,
            children,
        }
    }

    #[test]
    fn test_distant_trailing_separator_is_ignored() {
        // foo      obj.
        let error = interior("ERROR", true, vec![leaf("identifier", "foo", 0), leaf("identifier", "obj", 9), leaf(".", ".", 12)]);
        let root = interior("program", false, vec![error]);
        let source = "foo      obj.";

        let far = extract_context(&root, source, 0, 2);
        assert_eq!(far.kind, ContextKind::Identifier);
        assert_eq!(far.partial_text, "fo");

        let near = extract_context(&root, source, 0, 13);
        assert_eq!(near.kind, ContextKind::Property);
        assert_eq!(near.base_expr, "obj");
    }
}
