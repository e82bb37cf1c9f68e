//! JSON file checkpoint backend
//!
//! One document per target per run, at `<root>/<run-id>/info-<site>.json`.

use crate::catalog::CrawlState;
use crate::storage::traits::{CheckpointStore, StorageError, StorageResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Checkpoint store writing a single JSON document
#[derive(Debug, Clone)]
pub struct JsonCheckpointStore {
    path: PathBuf,
}

impl JsonCheckpointStore {
    /// Creates a store for an explicit file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the store for `site` inside a run directory
    pub fn for_run(run_dir: &Path, site: &str) -> Self {
        Self::new(run_dir.join(format!("info-{}.json", site)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn load(&self) -> StorageResult<Option<CrawlState>> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let state = serde_json::from_slice(&content).map_err(|source| StorageError::Malformed {
            path: self.path.clone(),
            source,
        })?;

        Ok(Some(state))
    }

    fn save(&self, state: &CrawlState) -> StorageResult<()> {
        let content = serde_json::to_vec(state)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        // Write beside the target, then rename over it
        let temp = self.temp_path();
        fs::write(&temp, &content).map_err(|e| self.io_error(e))?;
        fs::rename(&temp, &self.path).map_err(|e| self.io_error(e))?;

        tracing::debug!(
            "Checkpoint written to {} ({} bytes)",
            self.path.display(),
            content.len()
        );
        Ok(())
    }
}
