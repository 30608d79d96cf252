pub mod backend;
pub mod completion;
pub mod config;
pub mod error;
pub mod ir;
pub mod logging;
pub mod parsers;
pub mod snapshot;

pub use backend::{Analysis, AnalysisService};
pub use config::AnalysisConfig;
pub use error::{ParseError, ServiceError};
