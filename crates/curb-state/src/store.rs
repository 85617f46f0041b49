//! # Declaration Store
//!
//! The keyed store seam for marker entries: `get`/`upsert` plus an atomic
//! `with_slot` closure for read-check-write sequences. The trait exists so
//! the backend is swappable (and fakeable in tests) without touching the
//! state machine.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use curb_core::MarkerCode;

use crate::declaration::MarkerEntry;

/// Keyed store of marker entries.
///
/// `with_slot` is the linearization point for transitions: the closure runs
/// against the entry slot under the store's write protection, so a
/// read-check-write sequence inside it cannot interleave with another
/// writer for any marker. Implementations must not invoke the closure
/// outside that protection.
pub trait MarkerStore: Send + Sync {
    /// Retrieve the entry for a marker code.
    fn get(&self, code: &MarkerCode) -> Option<MarkerEntry>;

    /// Insert or replace the entry for a marker code (last write wins).
    fn upsert(&self, code: &MarkerCode, entry: MarkerEntry);

    /// Run `f` against the entry slot for `code` atomically.
    ///
    /// The slot is `None` when the marker has never been stored; the
    /// closure may fill it (create-on-first-use) or mutate the existing
    /// entry in place. Entries are never deleted — a closure that leaves
    /// the slot empty simply stores nothing.
    fn with_slot<R>(&self, code: &MarkerCode, f: impl FnOnce(&mut Option<MarkerEntry>) -> R) -> R
    where
        Self: Sized;
}

/// Thread-safe, cloneable in-memory [`MarkerStore`].
///
/// All operations are synchronous (the RwLock is `parking_lot`, not
/// `tokio::sync`) because the lock is never held across `.await` points.
/// `parking_lot::RwLock` is non-poisonable — a panicking writer does not
/// permanently corrupt the store.
#[derive(Debug, Default)]
pub struct MemoryMarkerStore {
    data: Arc<RwLock<HashMap<MarkerCode, MarkerEntry>>>,
}

impl Clone for MemoryMarkerStore {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl MemoryMarkerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MarkerStore for MemoryMarkerStore {
    fn get(&self, code: &MarkerCode) -> Option<MarkerEntry> {
        self.data.read().get(code).cloned()
    }

    fn upsert(&self, code: &MarkerCode, entry: MarkerEntry) {
        self.data.write().insert(code.clone(), entry);
    }

    fn with_slot<R>(&self, code: &MarkerCode, f: impl FnOnce(&mut Option<MarkerEntry>) -> R) -> R {
        let mut guard = self.data.write();
        let mut slot = guard.get(code).cloned();
        let out = f(&mut slot);
        if let Some(entry) = slot {
            guard.insert(code.clone(), entry);
        }
        out
    }
}
