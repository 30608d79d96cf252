//! Parser modules

pub mod javascript;

pub use javascript::{ParsedProgram, parse_program};
