//! Admission-controlled fetch pool
//!
//! At most `workers` product fetches are in flight at once. Each admitted
//! fetch holds a semaphore permit from submission until its record is ready,
//! releases the permit, and only then hands the record to the collector.
//! Because the permit is gone before the send, a full collector channel can
//! hold up finished tasks without blocking new admissions forever.

use crate::catalog::ProductRecord;
use crate::crawler::ImageDownloader;
use crate::sites::SiteParser;
use crate::HarvestError;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

/// A finished fetch, tagged with its candidate's position in the section
#[derive(Debug, Clone)]
pub struct Fetched {
    pub index: usize,
    pub product: ProductRecord,
}

/// Bounded pool of product fetch tasks for one section
pub struct FetchPool {
    semaphore: Arc<Semaphore>,
    tasks: JoinSet<Result<(), HarvestError>>,
    parser: Arc<dyn SiteParser>,
    images: Arc<ImageDownloader>,
    results: mpsc::Sender<Fetched>,
    completed: usize,
}

impl FetchPool {
    /// Creates a pool admitting at most `workers` concurrent fetches
    ///
    /// # Arguments
    ///
    /// * `workers` - Concurrency cap
    /// * `parser` - Site parser shared by every task
    /// * `images` - Image downloader shared by every task
    /// * `results` - Channel feeding the section's collector
    pub fn new(
        workers: usize,
        parser: Arc<dyn SiteParser>,
        images: Arc<ImageDownloader>,
        results: mpsc::Sender<Fetched>,
    ) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(workers)),
            tasks: JoinSet::new(),
            parser,
            images,
            results,
            completed: 0,
        }
    }

    /// Admits candidate `index` of the section, waiting for a free slot
    ///
    /// Returns once the fetch has been spawned. Tasks that have already
    /// finished are reaped first so a fatal error stops admission early.
    pub async fn submit(&mut self, index: usize, url: String) -> Result<(), HarvestError> {
        self.reap()?;

        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| HarvestError::PoolClosed)?;

        let parser = Arc::clone(&self.parser);
        let images = Arc::clone(&self.images);
        let results = self.results.clone();

        self.tasks.spawn(async move {
            let mut product = parser.fetch_product(&url).await;

            if !product.images.is_empty() {
                let resolved = images.download_all(&mut product).await?;
                tracing::debug!(
                    "{}: {}/{} images stored",
                    url,
                    resolved,
                    product.images.len()
                );
            }

            drop(permit);

            if results.send(Fetched { index, product }).await.is_err() {
                tracing::warn!("Collector closed before {} was recorded", url);
            }
            Ok(())
        });

        Ok(())
    }

    /// Waits for every submitted fetch to finish
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of tasks completed by this pool
    /// * `Err(HarvestError)` - The first fatal task error; remaining tasks
    ///   are aborted when the pool is dropped
    pub async fn drain(mut self) -> Result<usize, HarvestError> {
        while let Some(joined) = self.tasks.join_next().await {
            joined??;
            self.completed += 1;
        }
        Ok(self.completed)
    }

    fn reap(&mut self) -> Result<(), HarvestError> {
        while let Some(joined) = self.tasks.try_join_next() {
            joined??;
            self.completed += 1;
        }
        Ok(())
    }
}
