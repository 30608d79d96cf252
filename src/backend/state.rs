use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::analysis::Analysis;

pub type DocumentId = String;

/// Registry of open documents. Held only for lookups, never across analysis.
pub(super) type DocumentRegistry = RwLock<FxHashMap<DocumentId, Arc<DocumentState>>>;

/// Per-document state shared between the service and its analysis tasks.
#[derive(Debug)]
pub(super) struct DocumentState {
    /// Highest sequence number issued for this document.
    latest: AtomicU64,
    closed: AtomicBool,
    current: RwLock<Arc<Analysis>>,
}

impl DocumentState {
    pub(super) fn new(analysis: Analysis) -> Self {
        Self {
            latest: AtomicU64::new(analysis.sequence()),
            closed: AtomicBool::new(false),
            current: RwLock::new(Arc::new(analysis)),
        }
    }

    /// Issues the next sequence number.
    pub(super) fn next_sequence(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(super) fn latest_sequence(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// True if no newer sequence number has been issued and the document is open.
    pub(super) fn is_current(&self, sequence: u64) -> bool {
        !self.closed.load(Ordering::SeqCst) && self.latest_sequence() == sequence
    }

    pub(super) fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub(super) fn analysis(&self) -> Arc<Analysis> {
        Arc::clone(&self.current.read())
    }

    /// Installs `analysis` unless a newer request superseded it. Returns whether it
    /// was applied.
    pub(super) fn apply(&self, analysis: Analysis) -> bool {
        let mut current = self.current.write();
        if !self.is_current(analysis.sequence()) || current.sequence() >= analysis.sequence() {
            return false;
        }
        *current = Arc::new(analysis);
        true
    }
}
