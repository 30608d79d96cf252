//! Typed JavaScript AST and the analyses built on it
//!
//! - `js_node`: AST node types and the [`js_node::AstNode`] trait
//! - `index`: positional index over any `AstNode` tree
//! - `scope`: scope and binding graph
//! - `transforms`: passes over the index (scope resolution, S-expression output)

pub mod index;
pub mod js_node;
pub mod scope;
pub mod transforms;
