//! Storage traits and error types
//!
//! This module defines the trait interface for checkpoint backends and the
//! associated error types.

use crate::catalog::CrawlState;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing checkpoints
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed checkpoint {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for checkpoint backends
///
/// A checkpoint is a full snapshot of one `CrawlState`. Every `save`
/// replaces the previous snapshot; there is no history.
pub trait CheckpointStore: Send + Sync {
    /// Loads the last saved snapshot
    ///
    /// Returns `Ok(None)` when nothing has been saved yet (cold start) and an
    /// error when a snapshot exists but cannot be decoded.
    fn load(&self) -> StorageResult<Option<CrawlState>>;

    /// Replaces the stored snapshot with `state`
    ///
    /// May block on file I/O. Async callers run it on the blocking pool.
    fn save(&self, state: &CrawlState) -> StorageResult<()>;
}
