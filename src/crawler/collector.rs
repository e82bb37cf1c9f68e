//! Result collector
//!
//! The collector is the only writer of the crawl state while a section is
//! being fetched. It receives finished records in arrival order, accumulates
//! the valid ones, and writes a checkpoint every `checkpoint_interval`
//! records plus once when the channel closes.
//!
//! Records arrive out of order, so the resume cursor only moves over the
//! contiguous run of processed candidates. A checkpoint can therefore hold
//! products from beyond its cursor; `CatalogEntry::pending` leaves those out
//! when the section is resumed.
//!
//! Checkpoint files are written on tokio's blocking pool.

use crate::catalog::CrawlState;
use crate::crawler::pool::Fetched;
use crate::output::Progress;
use crate::storage::CheckpointStore;
use crate::HarvestError;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Saves `state` without blocking the async runtime and hands it back
pub(crate) async fn save_checkpoint(
    store: &Arc<dyn CheckpointStore>,
    state: CrawlState,
) -> Result<CrawlState, HarvestError> {
    let store = Arc::clone(store);
    let saved = tokio::task::spawn_blocking(move || store.save(&state).map(|()| state)).await?;
    Ok(saved?)
}

pub struct Collector {
    store: Arc<dyn CheckpointStore>,
    checkpoint_interval: usize,
}

impl Collector {
    pub fn new(store: Arc<dyn CheckpointStore>, checkpoint_interval: usize) -> Self {
        Self {
            store,
            checkpoint_interval: checkpoint_interval.max(1),
        }
    }

    /// Consumes records for one section until every sender is dropped
    ///
    /// Takes ownership of `state` and hands it back once the final checkpoint
    /// has been written. The processed count starts at the number of
    /// candidates that are not pending, which is the cursor for a section
    /// that was checkpointed in order.
    ///
    /// # Arguments
    ///
    /// * `state` - Crawl state; only `sections[section]` is modified
    /// * `section` - Index of the section being fetched
    /// * `records` - Receiving end of the pool's result channel
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlState)` - The updated state after the final checkpoint
    /// * `Err(HarvestError)` - A checkpoint could not be written
    pub async fn run(
        self,
        mut state: CrawlState,
        section: usize,
        mut records: mpsc::Receiver<Fetched>,
    ) -> Result<CrawlState, HarvestError> {
        let Some(entry) = state.sections.get_mut(section) else {
            return Err(HarvestError::UnknownSection(section));
        };
        let candidates = entry.candidate_urls.len();

        let pending: HashSet<usize> = entry.pending().into_iter().map(|(i, _)| i).collect();
        let mut total = candidates - pending.len();

        // collected in an earlier run but beyond the saved cursor
        let mut finished = BTreeSet::new();
        for index in entry.resume_position..candidates {
            if !pending.contains(&index) {
                entry.complete(index, &mut finished);
            }
        }

        while let Some(Fetched { index, product }) = records.recv().await {
            total += 1;

            let entry = &mut state.sections[section];
            let fresh = index >= entry.resume_position && !finished.contains(&index);
            if !fresh {
                tracing::warn!("Candidate {} of section {} was already recorded", index, section);
            } else if product.is_valid() {
                entry.products.push(product);
            } else {
                tracing::debug!("Dropping invalid record for {}", product.url);
            }
            entry.complete(index, &mut finished);

            let progress = Progress {
                processed: total,
                candidates,
                accumulated: entry.products.len(),
            };
            tracing::info!("{}", progress);

            if total % self.checkpoint_interval == 0 {
                state = save_checkpoint(&self.store, state).await?;
                tracing::debug!(
                    "Checkpoint at {} records (cursor {})",
                    total,
                    state.sections[section].resume_position
                );
            }
        }

        save_checkpoint(&self.store, state).await
    }
}
