//! JavaScript Tree-Sitter CST to AST lowering
//!
//! Converts tree-sitter-javascript syntax trees into the typed AST of
//! [`crate::ir::js_node`].
//!
//! Lowering never fails. The CST is error tolerant and so is this pass:
//! - `ERROR` nodes become [`BadStmt`]/[`BadExpr`] wrappers around whatever children
//!   could still be lowered
//! - MISSING tokens (zero-width nodes inserted by error recovery) are lowered with the
//!   degenerate span, which the indexer skips
//! - grammar fields that are absent in a broken tree fall back to empty placeholders
//!
//! The lowering is split by syntactic category: `statements`, `expressions` and
//! `patterns` each add methods to [`Lowerer`].

mod expressions;
mod patterns;
mod statements;

use tree_sitter::Node as TSNode;
use tracing::trace;

use crate::ir::js_node::{BadExpr, Block, Expr, Ident, Program, Span, Stmt, Token, NodeKind};

use super::helpers::{node_text, span_of};

/// Stateless CST walker bound to one source text.
pub(crate) struct Lowerer<'a> {
    source: &'a str,
}

impl<'a> Lowerer<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self { source }
    }

    fn text(&self, node: TSNode) -> &'a str {
        node_text(node, self.source)
    }

    /// Lowers the `program` root. The program always spans the whole source.
    pub(crate) fn program(&self, root: TSNode) -> Program {
        let body = self.statements(root);
        trace!("Lowered program with {} top-level statements", body.len());
        Program {
            span: Span::new(1, self.source.len() as u32 + 1),
            body,
        }
    }

    fn ident(&self, node: TSNode) -> Ident {
        Ident::new(span_of(node), self.text(node))
    }
}

/// Placeholder for an expression the broken tree does not contain.
fn missing_expr() -> Expr {
    Expr::Bad(BadExpr { span: Span::default(), items: Vec::new() })
}

fn missing_stmt() -> Stmt {
    Stmt::Empty(Token { span: Span::default(), kind: NodeKind::EmptyStatement })
}

fn empty_block() -> Block {
    Block { span: Span::default(), body: Vec::new() }
}
