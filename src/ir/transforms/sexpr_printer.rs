//! S-expression rendering of an [`Index`] or a [`SnapshotNode`] tree
//!
//! Each node prints as `(Kind name? span? flags? text? children...)`. Limits on depth
//! and node count replace the cut-off part with a literal `(...)`; once the node budget
//! is spent nothing more is counted or printed, though open parentheses are still
//! closed so the output stays balanced.

use tracing::debug;

use crate::ir::index::{Index, NodeId};
use crate::ir::js_node::NodeKind;
use crate::snapshot::SnapshotNode;

const PLACEHOLDER: &str = "(...)";

/// Rendering switches shared by both tree kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SexprOptions {
    /// Byte span (`start..end`) for index nodes, `row:col-row:col` for snapshots.
    pub include_span: bool,
    /// Source text of leaves.
    pub include_text: bool,
    /// `:error` / `:missing` markers.
    pub include_flags: bool,
    /// Children of nodes at this depth are replaced by `(...)`. Root is depth 0.
    pub max_depth: Option<usize>,
    /// Total nodes printed before the rest is replaced by `(...)`.
    pub max_nodes: Option<usize>,
    /// Single line instead of one node per indented line.
    pub compact: bool,
}

impl Default for SexprOptions {
    fn default() -> Self {
        Self {
            include_span: true,
            include_text: true,
            include_flags: true,
            max_depth: None,
            max_nodes: None,
            compact: false,
        }
    }
}

/// Renders every root of `index`, one tree after another.
pub fn format_index(index: &Index, options: &SexprOptions) -> String {
    let mut printer = SexprPrinter::new(options);
    for root in index.roots() {
        printer.write_node(&IndexView { index, id: *root }, 0);
    }
    debug!("Formatted index of {} nodes ({} printed)", index.len(), printer.count);
    printer.finish()
}

pub fn format_snapshot(root: &SnapshotNode, options: &SexprOptions) -> String {
    let mut printer = SexprPrinter::new(options);
    printer.write_node(&root, 0);
    debug!("Formatted snapshot ({} nodes printed)", printer.count);
    printer.finish()
}

/// Quotes `atom` if it would not read back as a single bare symbol.
pub fn atom(atom: &str) -> String {
    let needs_quotes = atom.is_empty()
        || atom.chars().any(|c| c.is_whitespace() || c == '(' || c == ')' || c == '"');
    if needs_quotes { quote(atom) } else { atom.to_string() }
}

/// Always-quoted string with escapes.
pub fn quote(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('"');
    for c in text.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ if c.is_control() => escaped.push_str(&format!("\\u{:04x}", c as u32)),
            _ => escaped.push(c),
        }
    }
    escaped.push('"');
    escaped
}

/// What the printer needs from a tree node.
trait SexprNode: Sized {
    fn head(&self) -> String;
    fn span(&self) -> String;
    fn flags(&self) -> Vec<&'static str>;
    /// Leaf text; `None` for interior nodes.
    fn text(&self) -> Option<String>;
    fn children(&self) -> Vec<Self>;
}

struct IndexView<'a> {
    index: &'a Index,
    id: NodeId,
}

impl SexprNode for IndexView<'_> {
    fn head(&self) -> String {
        let Some(node) = self.index.node(self.id) else {
            return "?".to_string();
        };
        let mut head = atom(node.kind.as_str());
        if let Some(name) = &node.name {
            head.push(' ');
            head.push_str(&quote(name));
        } else if !node.label.is_empty() {
            head.push(' ');
            head.push_str(&atom(&node.label));
        }
        head
    }

    fn span(&self) -> String {
        self.index.node(self.id).map(|n| format!("{}..{}", n.start, n.end)).unwrap_or_default()
    }

    fn flags(&self) -> Vec<&'static str> {
        match self.index.node(self.id).map(|n| n.kind) {
            Some(NodeKind::BadStatement | NodeKind::BadExpression) => vec![":error"],
            _ => Vec::new(),
        }
    }

    fn text(&self) -> Option<String> {
        let node = self.index.node(self.id)?;
        if node.child_ids.is_empty() { self.index.text_of(self.id) } else { None }
    }

    fn children(&self) -> Vec<Self> {
        self.index
            .node(self.id)
            .map(|n| n.child_ids.iter().map(|id| IndexView { index: self.index, id: *id }).collect())
            .unwrap_or_default()
    }
}

impl SexprNode for &SnapshotNode {
    fn head(&self) -> String {
        atom(&self.kind)
    }

    fn span(&self) -> String {
        format!("{}:{}-{}:{}", self.start_row, self.start_col, self.end_row, self.end_col)
    }

    fn flags(&self) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if self.is_error {
            flags.push(":error");
        }
        if self.is_missing {
            flags.push(":missing");
        }
        flags
    }

    fn text(&self) -> Option<String> {
        self.text.clone()
    }

    fn children(&self) -> Vec<Self> {
        let node = *self;
        node.children.iter().collect()
    }
}

struct SexprPrinter<'o> {
    options: &'o SexprOptions,
    out: String,
    count: usize,
    exhausted: bool,
}

impl<'o> SexprPrinter<'o> {
    fn new(options: &'o SexprOptions) -> Self {
        Self { options, out: String::new(), count: 0, exhausted: false }
    }

    fn finish(self) -> String {
        self.out
    }

    fn break_line(&mut self, depth: usize) {
        if self.out.is_empty() {
            return;
        }
        if self.options.compact {
            self.out.push(' ');
        } else {
            self.out.push('\n');
            self.out.push_str(&"  ".repeat(depth));
        }
    }

    fn placeholder(&mut self, depth: usize) {
        self.break_line(depth);
        self.out.push_str(PLACEHOLDER);
    }

    fn write_node<N: SexprNode>(&mut self, node: &N, depth: usize) {
        if self.exhausted {
            return;
        }
        if self.options.max_nodes.is_some_and(|max| self.count >= max) {
            self.exhausted = true;
            self.placeholder(depth);
            return;
        }
        self.count += 1;

        self.break_line(depth);
        self.out.push('(');
        self.out.push_str(&node.head());
        if self.options.include_span {
            self.out.push(' ');
            self.out.push_str(&node.span());
        }
        if self.options.include_flags {
            for flag in node.flags() {
                self.out.push(' ');
                self.out.push_str(flag);
            }
        }
        if self.options.include_text {
            if let Some(text) = node.text() {
                self.out.push(' ');
                self.out.push_str(&quote(&text));
            }
        }

        let children = node.children();
        if !children.is_empty() {
            if self.options.max_depth.is_some_and(|max| depth >= max) {
                self.placeholder(depth + 1);
            } else {
                for child in &children {
                    self.write_node(child, depth + 1);
                    if self.exhausted {
                        break;
                    }
                }
            }
        }
        self.out.push(')');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::index::build_index;
    use crate::parsers::javascript::parse_program;
    use crate::snapshot::SnapshotParser;

    fn leaf(kind: &str, text: &str) -> SnapshotNode {
        SnapshotNode {
            kind: kind.to_string(),
            text: Some(text.to_string()),
            start_row: 0,
            start_col: 0,
            end_row: 0,
            end_col: text.len(),
            start_byte: 0,
            end_byte: text.len(),
            is_error: false,
            is_missing: false,
            children: Vec::new(),
        }
    }

    fn interior(kind: &str, children: Vec<SnapshotNode>) -> SnapshotNode {
        SnapshotNode { text: None, children, ..leaf(kind, "") }
    }

    #[test]
    fn test_atoms_with_spaces_or_parens_are_quoted() {
        assert_eq!(atom("identifier"), "identifier");
        assert_eq!(atom("("), "\"(\"");
        assert_eq!(atom("a b"), "\"a b\"");
        assert_eq!(quote("say \"hi\"\n"), "\"say \\\"hi\\\"\\n\"");
    }

    #[test]
    fn test_depth_limit_emits_placeholder() {
        let tree = interior("a", vec![interior("b", vec![interior("c", vec![leaf("d", "x")])])]);
        let options = SexprOptions { max_depth: Some(1), compact: true, ..Default::default() };
        let out = format_snapshot(&tree, &options);
        assert!(out.contains("(...)"), "{out}");
        assert!(!out.contains("(c"), "{out}");
        assert_eq!(out.matches('(').count(), out.matches(')').count());
    }

    #[test]
    fn test_node_budget_stops_output() {
        let tree = interior("root", (0..10).map(|i| leaf("n", &i.to_string())).collect());
        let options = SexprOptions { max_nodes: Some(3), compact: true, include_span: false, ..Default::default() };
        let out = format_snapshot(&tree, &options);
        assert_eq!(out, "(root (n \"0\") (n \"1\") (...))");
    }

    #[test]
    fn test_snapshot_flags_and_spans() {
        let mut missing = leaf(";", "");
        missing.is_missing = true;
        let tree = interior("program", vec![missing]);
        let out = format_snapshot(&tree, &SexprOptions { compact: true, ..Default::default() });
        assert_eq!(out, "(program 0:0-0:0 (; 0:0-0:0 :missing \"\"))");
    }

    #[test]
    fn test_index_rendering_is_indented() {
        let source = "x = 1;";
        let parsed = parse_program(source).unwrap();
        let index = build_index(&parsed.program, source);
        let out = format_index(&index, &SexprOptions::default());
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("(Program 1..7"));
        assert!(lines[1].starts_with("  (ExpressionStatement"));
        assert!(out.contains("(Identifier \"x\" 1..2 \"x\")"), "{out}");
    }

    #[test]
    fn test_real_snapshot_round_trips_text() {
        let root = SnapshotParser::new().unwrap().parse(b"a.b").unwrap();
        let out = format_snapshot(&root, &SexprOptions { include_span: false, compact: true, ..Default::default() });
        assert!(out.starts_with("(program (expression_statement (member_expression"), "{out}");
        assert!(out.contains("(property_identifier \"b\")"), "{out}");
    }
}
