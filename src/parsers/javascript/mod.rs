//! JavaScript parser - Tree-Sitter based parsing and AST lowering
//!
//! # Architecture
//!
//! - `parsing`: public API for parsing JavaScript with Tree-Sitter
//! - `helpers`: utilities shared by the lowering passes
//! - `conversion`: CST to AST lowering
//!
//! # Usage
//!
//! ```
//! use jsinsight::parsers::javascript::parse_program;
//!
//! let parsed = parse_program("function greet(name) { return name; }").unwrap();
//! assert_eq!(parsed.program.body.len(), 1);
//! ```

pub mod parsing;
pub(crate) mod helpers;
mod conversion;

pub use parsing::{ParseDiagnostic, ParsedProgram, lower_tree, new_parser, parse_program, parse_tree};
