//! An in-memory [`PersistentStore`].

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use warden_protocol::LedgerDocument;

use crate::{PersistentStore, StoreError};

/// Keeps the last saved document in memory.
///
/// Useful for hosts that don't want a ledger file at all, and for tests:
/// [`set_failing`](Self::set_failing) makes every save fail so callers can
/// check that in-memory state survives a persistence outage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<LedgerDocument>>,
    failing: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStore {
    /// An empty store, as on first start.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `document`, as after a restart.
    pub fn with_document(document: LedgerDocument) -> Self {
        Self {
            document: Mutex::new(Some(document)),
            ..Self::default()
        }
    }

    /// Makes subsequent loads and saves fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// The most recently saved document, if any.
    pub fn document(&self) -> Option<LedgerDocument> {
        self.document.lock().clone()
    }

    /// How many saves succeeded.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl PersistentStore for MemoryStore {
    fn load(&self) -> Result<Option<LedgerDocument>, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("load refused".into()));
        }
        Ok(self.document.lock().clone())
    }

    fn save(&self, document: &LedgerDocument) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("save refused".into()));
        }
        *self.document.lock() = Some(document.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
