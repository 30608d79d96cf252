//! Tree-Sitter parsing interface for JavaScript
//!
//! This module provides the public API for parsing JavaScript with Tree-Sitter and
//! lowering the concrete syntax tree (CST) into the typed AST in [`crate::ir::js_node`].
//!
//! Syntax errors are not failures: the CST is error tolerant, so every parse that
//! produces a tree also produces a program. Recovery sites are reported alongside
//! the program as [`ParseDiagnostic`]s.

use tree_sitter::{Node as TSNode, Parser, Tree};
use tracing::{debug, trace};

use crate::error::ParseError;
use crate::ir::js_node::{Program, Span};

use super::conversion::Lowerer;
use super::helpers::{node_text, span_of};

/// Maximum number of characters of offending text quoted in a diagnostic.
const DIAGNOSTIC_EXCERPT_CHARS: usize = 32;

/// A syntax error recovered by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// Position of the recovery site. Zero-width for missing tokens.
    pub span: Span,
    pub message: String,
}

/// A lowered program together with the syntax errors recovered while parsing it.
#[derive(Debug, Clone)]
pub struct ParsedProgram {
    pub program: Program,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl ParsedProgram {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Creates a Tree-Sitter parser configured for JavaScript.
pub fn new_parser() -> Result<Parser, ParseError> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_javascript::LANGUAGE.into())?;
    Ok(parser)
}

/// Parses JavaScript source into a Tree-Sitter syntax tree.
///
/// # Errors
/// Returns [`ParseError`] if the grammar cannot be loaded or the parser gives up
/// without producing a tree. Syntax errors in `source` are not errors here.
pub fn parse_tree(source: &str) -> Result<Tree, ParseError> {
    let mut parser = new_parser()?;
    parser.parse(source, None).ok_or(ParseError::NoTree)
}

/// Parses and lowers JavaScript source into the typed AST.
///
/// # Example
/// ```
/// use jsinsight::parsers::javascript::parse_program;
///
/// let parsed = parse_program("let answer = 42;").unwrap();
/// assert_eq!(parsed.program.body.len(), 1);
/// assert!(!parsed.has_errors());
/// ```
pub fn parse_program(source: &str) -> Result<ParsedProgram, ParseError> {
    let tree = parse_tree(source)?;
    Ok(lower_tree(&tree, source))
}

/// Lowers an existing syntax tree. `source` must be the text `tree` was parsed from.
pub fn lower_tree(tree: &Tree, source: &str) -> ParsedProgram {
    let root = tree.root_node();
    let program = Lowerer::new(source).program(root);
    let diagnostics = if root.has_error() {
        collect_diagnostics(root, source)
    } else {
        Vec::new()
    };
    debug!(
        "Lowered {} bytes into {} statements ({} syntax errors)",
        source.len(),
        program.body.len(),
        diagnostics.len()
    );
    ParsedProgram { program, diagnostics }
}

/// Walks the tree iteratively and records every ERROR and MISSING node.
fn collect_diagnostics(root: TSNode, source: &str) -> Vec<ParseDiagnostic> {
    let mut diagnostics = Vec::new();
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        let mut descend = node.has_error();
        if node.is_missing() {
            diagnostics.push(ParseDiagnostic {
                span: Span::new(node.start_byte() as u32 + 1, node.start_byte() as u32 + 1),
                message: format!("missing `{}`", node.kind()),
            });
        } else if node.is_error() {
            let excerpt: String = node_text(node, source).chars().take(DIAGNOSTIC_EXCERPT_CHARS).collect();
            trace!("ERROR node at {:?}: {:?}", span_of(node), excerpt);
            diagnostics.push(ParseDiagnostic {
                span: span_of(node),
                message: format!("unexpected `{}`", excerpt.trim()),
            });
            // Nested errors inside an error region add noise, not information.
            descend = false;
        }

        if descend && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return diagnostics;
            }
        }
    }
}
