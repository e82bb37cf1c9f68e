//! Storage module for persisting crawl checkpoints
//!
//! This module handles all checkpoint persistence for the crawler:
//! - The `CheckpointStore` trait implemented by every backend
//! - A JSON file backend used by real runs
//! - An in-memory backend that records every snapshot

mod json;
mod memory;
mod traits;

pub use json::JsonCheckpointStore;
pub use memory::MemoryCheckpointStore;
pub use traits::{CheckpointStore, StorageError, StorageResult};

use crate::config::Config;

/// Opens the checkpoint store for the configured run and site
///
/// # Example
///
/// ```no_run
/// use shelf_crawler::config::Config;
/// use shelf_crawler::storage::{open_checkpoint_store, CheckpointStore};
///
/// let store = open_checkpoint_store(&Config::default());
/// let resumed = store.load().unwrap().is_some();
/// ```
pub fn open_checkpoint_store(config: &Config) -> JsonCheckpointStore {
    JsonCheckpointStore::for_run(&config.run_dir(), &config.run.site)
}
