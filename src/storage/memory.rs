//! In-memory checkpoint backend
//!
//! Keeps every saved snapshot so callers can inspect checkpoint cadence.
//! Used by tests and by runs that should leave nothing on disk.

use crate::catalog::CrawlState;
use crate::storage::traits::{CheckpointStore, StorageResult};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    snapshots: Mutex<Vec<CrawlState>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `state`, as if resuming
    pub fn with_state(state: CrawlState) -> Self {
        Self {
            snapshots: Mutex::new(vec![state]),
        }
    }

    /// Number of snapshots written (including a seeded one)
    pub fn save_count(&self) -> usize {
        self.lock().len()
    }

    /// All snapshots in write order
    pub fn snapshots(&self) -> Vec<CrawlState> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CrawlState>> {
        // A poisoned lock only means a test panicked mid-save; the data is
        // still a list of complete snapshots.
        self.snapshots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load(&self) -> StorageResult<Option<CrawlState>> {
        Ok(self.lock().last().cloned())
    }

    fn save(&self, state: &CrawlState) -> StorageResult<()> {
        self.lock().push(state.clone());
        Ok(())
    }
}
