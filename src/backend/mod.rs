//! Document service with debounced, stale-safe re-analysis
//!
//! Every edit gets the document's next sequence number. The edit's task waits out the
//! debounce window, gives up if a newer edit arrived meanwhile, runs the analysis on
//! the blocking pool, and installs the result only if its number is still the latest.
//! Superseded results are dropped; nothing in flight is cancelled.

pub mod analysis;
mod state;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::completion::{CompletionCandidate, CompletionContext};
use crate::config::AnalysisConfig;
use crate::error::ServiceError;

pub use analysis::Analysis;
pub use state::DocumentId;
use state::{DocumentRegistry, DocumentState};

/// Shared handle; clones refer to the same registry.
#[derive(Clone)]
pub struct AnalysisService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    config: AnalysisConfig,
    documents: DocumentRegistry,
}

impl AnalysisService {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            inner: Arc::new(ServiceInner { config, documents: Default::default() }),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.inner.config
    }

    /// Analyses `source` synchronously and registers it, replacing any previous
    /// document with the same id.
    pub fn open(&self, id: impl Into<DocumentId>, source: &str) -> Result<Arc<Analysis>, ServiceError> {
        let id = id.into();
        let analysis = Analysis::build(source, 0, &self.inner.config)?;
        let state = Arc::new(DocumentState::new(analysis));
        let current = state.analysis();
        if let Some(previous) = self.inner.documents.write().insert(id.clone(), state) {
            previous.close();
        }
        debug!("Opened {} ({} nodes)", id, current.index().len());
        Ok(current)
    }

    /// Schedules re-analysis of `id` with new text.
    ///
    /// Must be called inside a tokio runtime. The handle resolves to `true` if this
    /// update's analysis was installed, `false` if a newer update or a close made it
    /// stale (or the analysis failed).
    pub fn update(&self, id: &str, source: impl Into<String>) -> Result<JoinHandle<bool>, ServiceError> {
        let state = self.document(id)?;
        let sequence = state.next_sequence();
        let source = source.into();
        let config = self.inner.config.clone();
        let id = id.to_string();
        trace!("Scheduled analysis #{} of {}", sequence, id);

        Ok(tokio::spawn(async move {
            tokio::time::sleep(config.debounce()).await;
            if !state.is_current(sequence) {
                trace!("Analysis #{} of {} superseded before start", sequence, id);
                return false;
            }

            let built = tokio::task::spawn_blocking(move || Analysis::build(&source, sequence, &config)).await;
            let analysis = match built {
                Ok(Ok(analysis)) => analysis,
                Ok(Err(e)) => {
                    warn!("Analysis #{} of {} failed: {}", sequence, id, e);
                    return false;
                }
                Err(e) => {
                    warn!("Analysis #{} of {} panicked: {}", sequence, id, ServiceError::from(e));
                    return false;
                }
            };

            let applied = state.apply(analysis);
            if applied {
                debug!("Applied analysis #{} of {}", sequence, id);
            } else {
                trace!("Discarded stale analysis #{} of {}", sequence, id);
            }
            applied
        }))
    }

    /// Forgets `id`. Pending updates for it will not apply.
    pub fn close(&self, id: &str) -> bool {
        match self.inner.documents.write().remove(id) {
            Some(state) => {
                state.close();
                debug!("Closed {}", id);
                true
            }
            None => false,
        }
    }

    /// Latest applied analysis of `id`.
    pub fn analysis(&self, id: &str) -> Option<Arc<Analysis>> {
        self.inner.documents.read().get(id).map(|state| state.analysis())
    }

    /// Highest sequence number issued for `id`; may be ahead of [`Self::analysis`].
    pub fn latest_sequence(&self, id: &str) -> Option<u64> {
        self.inner.documents.read().get(id).map(|state| state.latest_sequence())
    }

    /// Completion against the latest applied analysis.
    pub fn complete(
        &self,
        id: &str,
        row: usize,
        col: usize,
    ) -> Result<(CompletionContext, Vec<CompletionCandidate>), ServiceError> {
        let analysis = self.document(id)?.analysis();
        Ok(analysis.complete_at(row, col, None))
    }

    pub fn document_ids(&self) -> Vec<DocumentId> {
        let mut ids: Vec<DocumentId> = self.inner.documents.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn document(&self, id: &str) -> Result<Arc<DocumentState>, ServiceError> {
        self.inner
            .documents
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::UnknownDocument(id.to_string()))
    }
}

impl Default for AnalysisService {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
