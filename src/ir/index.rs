//! Positional index over a syntax tree
//!
//! [`build_index`] walks any tree exposed through [`AstNode`] and flattens it into an
//! arena of [`NodeRecord`]s keyed by dense integer ids. The index answers containment
//! queries ("which node is under this offset?"), converts between byte offsets and
//! line/column pairs, and carries a display-only expansion flag per node.
//!
//! # Offsets
//!
//! Offsets are 1-based byte offsets into the source, spans are half-open. Lines and
//! columns are 1-based as well; a column counts bytes from the start of its line.
//!
//! # Malformed nodes
//!
//! Partial parses can contain nodes without a usable position. A node whose span is
//! degenerate (`0..0`), or whose span accessor panics, is left out of the index and its
//! children are attached to the nearest ancestor that did make it in.

use std::panic::{AssertUnwindSafe, catch_unwind};

use ropey::Rope;
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use super::js_node::{AstNode, NodeKind, Span};
use super::scope::Resolution;

/// Dense arena id of an indexed node.
pub type NodeId = usize;

/// One indexed syntax-tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub id: NodeId,
    pub kind: NodeKind,
    /// 1-based start offset, inclusive.
    pub start: u32,
    /// 1-based end offset, exclusive.
    pub end: u32,
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
    /// Short display rendering; see [`AstNode::label`].
    pub label: String,
    /// Bare identifier or key name, when the node has one.
    pub name: Option<String>,
    /// `None` for roots.
    pub parent_id: Option<NodeId>,
    pub child_ids: Vec<NodeId>,
    pub depth: usize,
    /// Display-only visibility flag, see [`Index::visible_nodes`].
    pub expanded: bool,
}

impl NodeRecord {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Arena of [`NodeRecord`]s plus the lookup structures built alongside it.
#[derive(Debug)]
pub struct Index {
    nodes: FxHashMap<NodeId, NodeRecord>,
    roots: Vec<NodeId>,
    /// All ids sorted by `(start asc, end desc)`.
    ordered_by_start: Vec<NodeId>,
    /// Unclamped `(kind, span)` of each indexed AST node. Lets later passes that walk
    /// the typed tree find the record of the node they are looking at.
    position_keys: FxHashMap<(NodeKind, Span), NodeId>,
    rope: Rope,
    resolution: Option<Resolution>,
}

/// Builds an index over `root`. `source` must be the text the tree was parsed from.
pub fn build_index(root: &dyn AstNode, source: &str) -> Index {
    let mut builder = IndexBuilder {
        nodes: FxHashMap::default(),
        roots: Vec::new(),
        position_keys: FxHashMap::default(),
        rope: Rope::from_str(source),
        skipped: 0,
    };
    builder.walk(root);

    let IndexBuilder { nodes, roots, position_keys, rope, skipped } = builder;

    let mut ordered_by_start: Vec<NodeId> = nodes.keys().copied().collect();
    ordered_by_start.sort_by(|a, b| {
        let (ra, rb) = (&nodes[a], &nodes[b]);
        ra.start.cmp(&rb.start).then(rb.end.cmp(&ra.end)).then(a.cmp(b))
    });

    debug!(
        "Built index with {} nodes ({} roots, {} skipped) over {} bytes",
        nodes.len(),
        roots.len(),
        skipped,
        rope.len_bytes()
    );

    Index { nodes, roots, ordered_by_start, position_keys, rope, resolution: None }
}

struct IndexBuilder {
    nodes: FxHashMap<NodeId, NodeRecord>,
    roots: Vec<NodeId>,
    position_keys: FxHashMap<(NodeKind, Span), NodeId>,
    rope: Rope,
    skipped: usize,
}

impl IndexBuilder {
    /// Pre-order walk with an explicit stack so deeply nested trees cannot overflow.
    fn walk(&mut self, root: &dyn AstNode) {
        let mut stack: Vec<(&dyn AstNode, Option<NodeId>)> = vec![(root, None)];

        while let Some((node, parent)) = stack.pop() {
            let attach_to = match read_span(node) {
                Some(span) if !span.is_degenerate() => Some(self.insert(node, span, parent)),
                Some(_) => {
                    trace!("Skipping {} with degenerate span", node.kind());
                    self.skipped += 1;
                    parent
                }
                None => {
                    self.skipped += 1;
                    parent
                }
            };

            let children = match catch_unwind(AssertUnwindSafe(|| node.children())) {
                Ok(children) => children,
                Err(_) => {
                    warn!("Child enumeration of {} panicked; subtree dropped", node.kind());
                    continue;
                }
            };
            for child in children.into_iter().rev() {
                stack.push((child, attach_to));
            }
        }
    }

    fn insert(&mut self, node: &dyn AstNode, raw: Span, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        let kind = node.kind();

        let mut start = raw.start.max(1);
        let mut end = raw.end.max(start);
        let depth = match parent.and_then(|p| self.nodes.get(&p)) {
            Some(p) => {
                // Keep children inside their parent even when error recovery
                // produced overlapping spans.
                start = start.clamp(p.start, p.end);
                end = end.clamp(start, p.end);
                p.depth + 1
            }
            None => 0,
        };

        let (start_line, start_col) = line_col(&self.rope, start);
        let (end_line, end_col) = line_col(&self.rope, end);

        self.nodes.insert(
            id,
            NodeRecord {
                id,
                kind,
                start,
                end,
                start_line,
                start_col,
                end_line,
                end_col,
                label: node.label(),
                name: node.name().map(str::to_string),
                parent_id: parent,
                child_ids: Vec::new(),
                depth,
                expanded: parent.is_none(),
            },
        );
        match parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(p) => p.child_ids.push(id),
            None => self.roots.push(id),
        }
        self.position_keys.entry((kind, raw)).or_insert(id);
        id
    }
}

fn read_span(node: &dyn AstNode) -> Option<Span> {
    match catch_unwind(AssertUnwindSafe(|| node.span())) {
        Ok(span) => Some(span),
        Err(_) => {
            warn!("Reading the span of a {} node panicked; node skipped", node.kind());
            None
        }
    }
}

/// 1-based line/column of a 1-based offset, clamped to the end of the text.
fn line_col(rope: &Rope, offset: u32) -> (usize, usize) {
    let byte = (offset.max(1) as usize - 1).min(rope.len_bytes());
    let line = rope.try_byte_to_line(byte).unwrap_or(0);
    let line_start = rope.try_line_to_byte(line).unwrap_or(0);
    (line + 1, byte - line_start + 1)
}

impl Index {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The first root. Only a degenerate top-level node yields more than one root.
    pub fn root_id(&self) -> Option<NodeId> {
        self.roots.first().copied()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(&id)
    }

    /// All records in id (pre-order) order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeRecord> {
        (0..self.nodes.len()).filter_map(move |id| self.nodes.get(&id))
    }

    pub fn ordered_by_start(&self) -> &[NodeId] {
        &self.ordered_by_start
    }

    pub fn parent(&self, id: NodeId) -> Option<&NodeRecord> {
        self.node(id)?.parent_id.and_then(|p| self.node(p))
    }

    pub fn children(&self, id: NodeId) -> Vec<&NodeRecord> {
        self.node(id)
            .map(|n| n.child_ids.iter().filter_map(|c| self.node(*c)).collect())
            .unwrap_or_default()
    }

    /// Record id of the AST node with this kind and (unclamped) span.
    pub fn node_id_for(&self, kind: NodeKind, span: Span) -> Option<NodeId> {
        self.position_keys.get(&(kind, span)).copied()
    }

    /// Smallest node whose span contains `offset`; among equal sizes the deepest wins.
    pub fn node_at_offset(&self, offset: u32) -> Option<&NodeRecord> {
        let mut best: Option<&NodeRecord> = None;
        for id in &self.ordered_by_start {
            let Some(node) = self.nodes.get(id) else { continue };
            if node.start > offset {
                break;
            }
            if !node.contains(offset) {
                continue;
            }
            best = match best {
                Some(current)
                    if node.len() > current.len()
                        || (node.len() == current.len() && node.depth <= current.depth) =>
                {
                    Some(current)
                }
                _ => Some(node),
            };
        }
        best
    }

    /// Root-to-node path, inclusive. Empty for unknown ids.
    pub fn ancestor_path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = self.node(id);
        while let Some(node) = current {
            path.push(node.id);
            current = node.parent_id.and_then(|p| self.node(p));
        }
        path.reverse();
        path
    }

    /// Pre-order flattening that does not descend into collapsed nodes.
    pub fn visible_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            out.push(id);
            if node.expanded {
                stack.extend(node.child_ids.iter().rev().copied());
            }
        }
        out
    }

    /// Flips the expansion flag of `id` and returns the new state.
    pub fn toggle_expand(&mut self, id: NodeId) -> Option<bool> {
        let node = self.nodes.get_mut(&id)?;
        node.expanded = !node.expanded;
        Some(node.expanded)
    }

    /// Expands every ancestor of `id` that has children so `id` becomes visible.
    pub fn expand_to(&mut self, id: NodeId) {
        let path = self.ancestor_path(id);
        for ancestor in path.iter().take(path.len().saturating_sub(1)) {
            if let Some(node) = self.nodes.get_mut(ancestor) {
                if !node.child_ids.is_empty() {
                    node.expanded = true;
                }
            }
        }
    }

    /// 1-based `(line, col)` of a 1-based offset. Offsets past the end are clamped
    /// to the position just after the last byte.
    pub fn offset_to_line_col(&self, offset: u32) -> (usize, usize) {
        line_col(&self.rope, offset)
    }

    /// Inverse of [`Index::offset_to_line_col`]. `None` when the line does not exist
    /// or the column runs past the end of the text.
    pub fn line_col_to_offset(&self, line: usize, col: usize) -> Option<u32> {
        if line == 0 || col == 0 || line > self.rope.len_lines() {
            return None;
        }
        let line_start = self.rope.try_line_to_byte(line - 1).ok()?;
        // First byte that belongs to the next line; the last line may address one
        // past the final byte.
        let line_limit = if line < self.rope.len_lines() {
            self.rope.try_line_to_byte(line).ok()?
        } else {
            self.rope.len_bytes() + 1
        };
        let byte = line_start + col - 1;
        if byte >= line_limit {
            return None;
        }
        Some(byte as u32 + 1)
    }

    /// Source excerpt covered by a node.
    pub fn text_of(&self, id: NodeId) -> Option<String> {
        let node = self.node(id)?;
        let start = node.start as usize - 1;
        let end = node.end as usize - 1;
        let slice = self.rope.get_byte_slice(start..end.min(self.rope.len_bytes()))?;
        Some(slice.to_string())
    }

    pub fn source(&self) -> String {
        self.rope.to_string()
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn attach_resolution(&mut self, resolution: Resolution) {
        self.resolution = Some(resolution);
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal hand-built tree; `span: None` panics when read.
    struct TestNode {
        kind: NodeKind,
        span: Option<Span>,
        children: Vec<TestNode>,
    }

    impl TestNode {
        fn new(kind: NodeKind, start: u32, end: u32, children: Vec<TestNode>) -> Self {
            Self { kind, span: Some(Span::new(start, end)), children }
        }
    }

    impl AstNode for TestNode {
        fn kind(&self) -> NodeKind {
            self.kind
        }
        fn span(&self) -> Span {
            match self.span {
                Some(span) => span,
                None => panic!("span unavailable"),
            }
        }
        fn children(&self) -> Vec<&dyn AstNode> {
            self.children.iter().map(|c| c as &dyn AstNode).collect()
        }
    }

    fn sample() -> TestNode {
        // "ab cd\nef"
        TestNode::new(
            NodeKind::Program,
            1,
            9,
            vec![
                TestNode::new(
                    NodeKind::ExpressionStatement,
                    1,
                    6,
                    vec![
                        TestNode::new(NodeKind::Identifier, 1, 3, vec![]),
                        TestNode::new(NodeKind::Identifier, 4, 6, vec![]),
                    ],
                ),
                TestNode::new(NodeKind::Identifier, 7, 9, vec![]),
            ],
        )
    }

    #[test]
    fn test_ids_assigned_in_pre_order() {
        let index = build_index(&sample(), "ab cd\nef");
        let kinds: Vec<NodeKind> = index.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Program,
                NodeKind::ExpressionStatement,
                NodeKind::Identifier,
                NodeKind::Identifier,
                NodeKind::Identifier,
            ]
        );
        assert_eq!(index.root_id(), Some(0));
        assert_eq!(index.node(2).and_then(|n| n.parent_id), Some(1));
        assert_eq!(index.node(4).map(|n| n.depth), Some(1));
    }

    #[test]
    fn test_node_at_offset_prefers_smallest() {
        let index = build_index(&sample(), "ab cd\nef");
        assert_eq!(index.node_at_offset(2).map(|n| n.id), Some(2));
        // The space between identifiers belongs to the statement.
        assert_eq!(index.node_at_offset(3).map(|n| n.id), Some(1));
        assert_eq!(index.node_at_offset(6).map(|n| n.id), Some(0));
        assert!(index.node_at_offset(9).is_none());
        assert!(index.node_at_offset(0).is_none());
    }

    #[test]
    fn test_equal_spans_resolve_to_deepest() {
        let tree = TestNode::new(
            NodeKind::Program,
            1,
            4,
            vec![TestNode::new(
                NodeKind::ExpressionStatement,
                1,
                4,
                vec![TestNode::new(NodeKind::Identifier, 1, 4, vec![])],
            )],
        );
        let index = build_index(&tree, "abc");
        assert_eq!(index.node_at_offset(1).map(|n| n.kind), Some(NodeKind::Identifier));
    }

    #[test]
    fn test_degenerate_and_panicking_nodes_are_skipped() {
        let tree = TestNode::new(
            NodeKind::Program,
            1,
            9,
            vec![
                TestNode::new(
                    NodeKind::BadExpression,
                    0,
                    0,
                    vec![TestNode::new(NodeKind::Identifier, 1, 3, vec![])],
                ),
                TestNode {
                    kind: NodeKind::BadStatement,
                    span: None,
                    children: vec![TestNode::new(NodeKind::Identifier, 4, 6, vec![])],
                },
            ],
        );
        let index = build_index(&tree, "ab cd\nef");
        assert_eq!(index.len(), 3);
        assert!(index.iter().all(|n| n.kind != NodeKind::BadExpression));
        assert!(index.iter().all(|n| n.kind != NodeKind::BadStatement));
        // Children of skipped nodes hang off the program.
        assert_eq!(index.node(0).map(|n| n.child_ids.clone()), Some(vec![1, 2]));
    }

    #[test]
    fn test_spans_are_clamped() {
        let tree = TestNode::new(
            NodeKind::Program,
            2,
            5,
            vec![TestNode::new(NodeKind::Identifier, 1, 9, vec![]), TestNode::new(NodeKind::Identifier, 4, 3, vec![])],
        );
        let index = build_index(&tree, "abcdefgh");
        let first = index.node(1).unwrap();
        assert_eq!((first.start, first.end), (2, 5));
        let second = index.node(2).unwrap();
        assert_eq!((second.start, second.end), (4, 4));
        // Lookups still use the raw span.
        assert_eq!(index.node_id_for(NodeKind::Identifier, Span::new(1, 9)), Some(1));
    }

    #[test]
    fn test_line_col_conversion() {
        let index = build_index(&sample(), "ab cd\nef");
        assert_eq!(index.offset_to_line_col(1), (1, 1));
        assert_eq!(index.offset_to_line_col(6), (1, 6));
        assert_eq!(index.offset_to_line_col(7), (2, 1));
        assert_eq!(index.offset_to_line_col(9), (2, 3));
        assert_eq!(index.line_col_to_offset(2, 2), Some(8));
        assert_eq!(index.line_col_to_offset(3, 1), None);
        let node = index.node(4).unwrap();
        assert_eq!((node.start_line, node.start_col, node.end_line, node.end_col), (2, 1, 2, 3));
    }

    #[test]
    fn test_visibility_and_expansion() {
        let mut index = build_index(&sample(), "ab cd\nef");
        // Only the root starts expanded.
        assert_eq!(index.visible_nodes(), vec![0, 1, 4]);
        assert_eq!(index.toggle_expand(1), Some(true));
        assert_eq!(index.visible_nodes(), vec![0, 1, 2, 3, 4]);
        index.toggle_expand(0);
        assert_eq!(index.visible_nodes(), vec![0]);
        index.expand_to(3);
        assert!(index.visible_nodes().contains(&3));
        assert_eq!(index.toggle_expand(99), None);
    }

    #[test]
    fn test_ancestor_path_and_text() {
        let index = build_index(&sample(), "ab cd\nef");
        assert_eq!(index.ancestor_path(3), vec![0, 1, 3]);
        assert!(index.ancestor_path(42).is_empty());
        assert_eq!(index.text_of(3).as_deref(), Some("cd"));
        assert_eq!(index.text_of(4).as_deref(), Some("ef"));
    }
}
