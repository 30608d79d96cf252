//! Error types for the fallible edges of the analysis core
//!
//! Lookups and resolution never fail; misses are `None` and unresolved names are
//! recorded as data. Only parser construction and the asynchronous document
//! service can produce errors.

use thiserror::Error;

/// The JavaScript parser could not be set up or produced nothing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to load the JavaScript grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("parser returned no syntax tree")]
    NoTree,
}

/// Failures surfaced by [`crate::backend::AnalysisService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unknown document: {0}")]
    UnknownDocument(String),

    #[error("analysis task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
