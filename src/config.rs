//! Analysis settings
//!
//! Checked in order:
//! 1. `JSINSIGHT_CONFIG`: path to a JSON file with any subset of the fields below
//! 2. `JSINSIGHT_DEBOUNCE_MS` and `JSINSIGHT_SNAPSHOT_MAX_DEPTH` override single fields
//! 3. Defaults
//!
//! Bad values are logged and ignored.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::snapshot::DEFAULT_MAX_DEPTH;

pub const CONFIG_ENV: &str = "JSINSIGHT_CONFIG";
pub const DEBOUNCE_ENV: &str = "JSINSIGHT_DEBOUNCE_MS";
pub const SNAPSHOT_DEPTH_ENV: &str = "JSINSIGHT_SNAPSHOT_MAX_DEPTH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Quiet period after an edit before the document is re-analysed.
    pub debounce_ms: u64,
    /// Deepest CST level copied into a snapshot.
    pub snapshot_max_depth: usize,
    pub completion: CompletionConfig,
    /// Default filter for the CLI logger when `--log-level` is absent.
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Upper bound on candidates returned per request.
    pub max_results: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 150,
            snapshot_max_depth: DEFAULT_MAX_DEPTH,
            completion: CompletionConfig::default(),
            log_level: None,
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self { max_results: 200 }
    }
}

impl AnalysisConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Reads a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env_or_default`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = match lookup(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)).unwrap_or_else(|e| {
                warn!("Ignoring {}: {:#}", CONFIG_ENV, e);
                Self::default()
            }),
            None => Self::default(),
        };

        if let Some(value) = lookup(DEBOUNCE_ENV) {
            match value.trim().parse::<u64>() {
                Ok(ms) => config.debounce_ms = ms,
                Err(_) => warn!("Invalid {}={:?}, keeping {}ms", DEBOUNCE_ENV, value, config.debounce_ms),
            }
        }
        if let Some(value) = lookup(SNAPSHOT_DEPTH_ENV) {
            match value.trim().parse::<usize>() {
                Ok(depth) if depth > 0 => config.snapshot_max_depth = depth,
                _ => warn!(
                    "Invalid {}={:?}, keeping {}",
                    SNAPSHOT_DEPTH_ENV, value, config.snapshot_max_depth
                ),
            }
        }

        debug!("Analysis config: {:?}", config);
        config
    }
}
