//! Code completion for JavaScript
//!
//! This module provides:
//! - Cursor context detection over a CST snapshot (`context`)
//! - Candidate lookup against the index and scope graph (`candidates`)
//! - Member tables for built-in globals and the keyword list (`builtins`)
//! - Priority merging of static, module-alias and runtime sources (`ranking`)

pub mod builtins;
pub mod candidates;
pub mod context;
pub mod ranking;

pub use builtins::keyword_candidates;
pub use candidates::{CandidateKind, CompletionCandidate, declared_in_snapshot, resolve_candidates};
pub use context::{CompletionContext, ContextKind, extract_context};
pub use ranking::{CandidateSource, RankedCandidate, merge_ranked};
