//! Owned snapshots of the tree-sitter concrete syntax tree
//!
//! A [`SnapshotNode`] is a by-value copy of a tree-sitter node and its subtree. It does
//! not borrow from the [`tree_sitter::Tree`], so a snapshot stays valid after the
//! parser is reused for the next buffer. Only leaves carry text.
//!
//! Positions are 0-based rows and columns (bytes within the row), as reported by
//! tree-sitter.

use tree_sitter::{Node as TSNode, Parser, Tree};
use tracing::{debug, trace, warn};

use crate::error::ParseError;
use crate::parsers::javascript::new_parser;

/// Subtrees nested deeper than this are dropped from the copy.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// One CST node, copied out of the parser's tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotNode {
    pub kind: String,
    /// Exact source text; `None` for interior nodes.
    pub text: Option<String>,
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
    pub start_byte: usize,
    pub end_byte: usize,
    pub is_error: bool,
    /// Zero-width token inserted by error recovery.
    pub is_missing: bool,
    /// Named or anonymous, in source order. Comments included.
    pub children: Vec<SnapshotNode>,
}

impl SnapshotNode {
    pub fn start(&self) -> (usize, usize) {
        (self.start_row, self.start_col)
    }

    pub fn end(&self) -> (usize, usize) {
        (self.end_row, self.end_col)
    }

    /// True if `(row, col)` lies in `[start, end)`.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        let point = (row, col);
        self.start() <= point && point < self.end()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Deepest node whose range contains `(row, col)`.
    pub fn node_at_position(&self, row: usize, col: usize) -> Option<&SnapshotNode> {
        if !self.contains(row, col) {
            return None;
        }
        let mut current = self;
        while let Some(child) = current.children.iter().find(|c| c.contains(row, col)) {
            current = child;
        }
        Some(current)
    }

    /// True if this node or any descendant is an error node.
    pub fn has_error(&self) -> bool {
        self.is_error || self.children.iter().any(SnapshotNode::has_error)
    }

    /// Leaf texts of the subtree, concatenated in order.
    pub fn leaf_text(&self) -> String {
        let mut out = String::new();
        for node in self.walk() {
            if let Some(text) = &node.text {
                out.push_str(text);
            }
        }
        out
    }

    /// Root-to-`target` path, inclusive. `target` must be a node of this tree
    /// (compared by address).
    pub fn path_to<'a>(&'a self, target: &SnapshotNode) -> Option<Vec<&'a SnapshotNode>> {
        let mut path = vec![self];
        if self.find_path(target, &mut path) { Some(path) } else { None }
    }

    fn find_path<'a>(&'a self, target: &SnapshotNode, path: &mut Vec<&'a SnapshotNode>) -> bool {
        if std::ptr::eq(self, target) {
            return true;
        }
        for child in &self.children {
            path.push(child);
            if child.find_path(target, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    /// Pre-order iterator over the subtree.
    pub fn walk(&self) -> SnapshotWalk<'_> {
        SnapshotWalk { stack: vec![self] }
    }
}

/// Pre-order traversal of a [`SnapshotNode`] subtree.
pub struct SnapshotWalk<'a> {
    stack: Vec<&'a SnapshotNode>,
}

impl<'a> Iterator for SnapshotWalk<'a> {
    type Item = &'a SnapshotNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Parses JavaScript buffers into owned snapshots.
pub struct SnapshotParser {
    parser: Parser,
    max_depth: usize,
}

impl SnapshotParser {
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self { parser: new_parser()?, max_depth: DEFAULT_MAX_DEPTH })
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Parses `source` from scratch and copies the resulting tree.
    ///
    /// Returns `None` only if tree-sitter produced no tree (cancelled parse).
    pub fn parse(&mut self, source: &[u8]) -> Option<SnapshotNode> {
        self.parser.reset();
        let Some(tree) = self.parser.parse(source, None) else {
            warn!("Tree-sitter returned no tree for {} bytes", source.len());
            return None;
        };
        Some(snapshot_tree(&tree, source, self.max_depth))
    }
}

/// Copies an already-parsed `tree` of `source`.
pub fn snapshot_tree(tree: &Tree, source: &[u8], max_depth: usize) -> SnapshotNode {
    let mut truncated = 0usize;
    let root = copy_node(tree.root_node(), source, 0, max_depth.max(1), &mut truncated);
    if truncated > 0 {
        debug!("Snapshot truncated {} subtrees below depth {}", truncated, max_depth);
    }
    debug!("Snapshot of {} bytes: root={} has_error={}", source.len(), root.kind, tree.root_node().has_error());
    root
}

fn copy_node(node: TSNode, source: &[u8], depth: usize, max_depth: usize, truncated: &mut usize) -> SnapshotNode {
    let start = node.start_position();
    let end = node.end_position();
    let child_count = node.child_count();

    let mut children = Vec::new();
    if child_count > 0 {
        if depth + 1 >= max_depth {
            *truncated += 1;
            trace!("Dropping children of {} at depth {}", node.kind(), depth);
        } else {
            children.reserve(child_count);
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                children.push(copy_node(child, source, depth + 1, max_depth, truncated));
            }
        }
    }

    let text = (child_count == 0).then(|| {
        let bytes = source.get(node.start_byte()..node.end_byte()).unwrap_or_default();
        String::from_utf8_lossy(bytes).into_owned()
    });

    SnapshotNode {
        kind: node.kind().to_string(),
        text,
        start_row: start.row,
        start_col: start.column,
        end_row: end.row,
        end_col: end.column,
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
        is_error: node.is_error(),
        is_missing: node.is_missing(),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(source: &str) -> SnapshotNode {
        SnapshotParser::new().unwrap().parse(source.as_bytes()).unwrap()
    }

    #[test]
    fn test_leaves_carry_text() {
        let root = snapshot("let answer = 42;");
        assert_eq!(root.kind, "program");
        assert!(root.text.is_none());
        let leaves: Vec<&str> = root.walk().filter_map(|n| n.text.as_deref()).collect();
        assert_eq!(leaves, vec!["let", "answer", "=", "42", ";"]);
        assert_eq!(root.leaf_text(), "letanswer=42;");
    }

    #[test]
    fn test_node_at_position_is_most_specific() {
        let root = snapshot("foo.bar(1);\nbaz;");
        let node = root.node_at_position(0, 5).unwrap();
        assert_eq!(node.kind, "property_identifier");
        assert_eq!(node.text.as_deref(), Some("bar"));
        let node = root.node_at_position(1, 1).unwrap();
        assert_eq!(node.kind, "identifier");
        assert!(root.node_at_position(5, 0).is_none());
    }

    #[test]
    fn test_error_flag_propagates() {
        assert!(!snapshot("a + b;").has_error());
        assert!(snapshot("let = ;").has_error());
    }

    #[test]
    fn test_depth_limit_truncates() {
        let mut parser = SnapshotParser::new().unwrap().with_max_depth(2);
        let root = parser.parse(b"f(g(h(1)));").unwrap();
        assert!(root.child_count() > 0);
        assert!(root.children.iter().all(|c| c.is_leaf()));
    }

    #[test]
    fn test_path_to_starts_at_root() {
        let root = snapshot("x.y;");
        let leaf = root.node_at_position(0, 2).unwrap();
        let path = root.path_to(leaf).unwrap();
        assert_eq!(path.first().map(|n| n.kind.as_str()), Some("program"));
        assert_eq!(path.last().map(|n| n.kind.as_str()), Some("property_identifier"));
        assert!(path.iter().any(|n| n.kind == "member_expression"));
    }

    #[test]
    fn test_parser_is_reusable() {
        let mut parser = SnapshotParser::new().unwrap();
        let first = parser.parse(b"a;").unwrap();
        let second = parser.parse(b"b.c;").unwrap();
        assert_eq!(first.leaf_text(), "a;");
        assert_eq!(second.leaf_text(), "b.c;");
    }
}
