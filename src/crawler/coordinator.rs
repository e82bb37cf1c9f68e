//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives one run from start to finish:
//! - Loading the checkpoint, or discovering sections from sitemaps
//! - Fetching each unfinished section through the bounded pool
//! - Handing results to the section's collector
//! - Checkpointing between sections
//!
//! Sections are processed one at a time. Within a section, the pool bounds
//! concurrency and the collector is the single writer of the crawl state.

use crate::catalog::CrawlState;
use crate::config::Config;
use crate::crawler::collector::{save_checkpoint, Collector};
use crate::crawler::pool::FetchPool;
use crate::crawler::sitemap::discover;
use crate::crawler::{build_http_client, ImageDownloader};
use crate::output::RunSummary;
use crate::sites::{SiteKind, SiteParser};
use crate::state::CrawlPhase;
use crate::storage::{open_checkpoint_store, CheckpointStore};
use crate::HarvestError;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    parser: Arc<dyn SiteParser>,
    store: Arc<dyn CheckpointStore>,
    client: Client,
    images: Arc<ImageDownloader>,
    phase: CrawlPhase,
}

impl Coordinator {
    /// Creates a coordinator for the configured site
    ///
    /// The site name is resolved to its canonical identity before the config
    /// is frozen, so checkpoint and image paths never depend on the alias the
    /// operator typed.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - Unknown site or HTTP client setup failure
    pub fn new(mut config: Config) -> Result<Self, HarvestError> {
        let kind = SiteKind::from_name(&config.run.site)?;
        config.run.site = kind.name().to_string();

        let client = build_http_client(&config.http)?;
        let parser = kind.parser(client.clone());
        let store: Arc<dyn CheckpointStore> = Arc::new(open_checkpoint_store(&config));

        Ok(Self::with_parts(config, parser, store, client))
    }

    /// Creates a coordinator from explicit collaborators
    ///
    /// Images are stored under `<run dir>/<config.run.site>/`.
    pub fn with_parts(
        config: Config,
        parser: Arc<dyn SiteParser>,
        store: Arc<dyn CheckpointStore>,
        client: Client,
    ) -> Self {
        let site_dir = config.run_dir().join(&config.run.site);
        let images = Arc::new(ImageDownloader::new(client.clone(), site_dir));

        Self {
            config: Arc::new(config),
            parser,
            store,
            client,
            images,
            phase: CrawlPhase::Discovering,
        }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("Phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Loads the run's checkpoint, or discovers sections and writes the
    /// initial one
    async fn prepare(&self) -> Result<CrawlState, HarvestError> {
        if let Some(state) = self.store.load()? {
            tracing::info!(
                "Resuming {}: {} sections, {} candidates, {} products",
                state.site,
                state.sections.len(),
                state.candidate_count(),
                state.product_count()
            );
            return Ok(state);
        }

        tracing::info!("No checkpoint found, discovering sections");
        let state = discover(&self.client, self.parser.as_ref()).await;
        tracing::info!(
            "Discovered {} sections with {} candidates",
            state.sections.len(),
            state.candidate_count()
        );

        save_checkpoint(&self.store, state).await
    }

    /// Runs the crawl to completion
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlState)` - Final state, also persisted as the last checkpoint
    /// * `Err(HarvestError)` - A checkpoint or image could not be written, or
    ///   a worker task failed
    pub async fn run(&mut self) -> Result<CrawlState, HarvestError> {
        tracing::info!(
            "Starting crawl of {} (run {})",
            self.config.run.site,
            self.config.run.run_id
        );
        let start_time = Instant::now();

        let mut state = self.prepare().await?;

        for section in 0..state.sections.len() {
            let entry = &state.sections[section];
            if entry.candidate_urls.is_empty() {
                tracing::debug!("Skipping empty section {}", entry.url);
                continue;
            }
            if entry.is_complete() {
                tracing::debug!("Skipping finished section {}", entry.url);
                continue;
            }

            state = self.crawl_section(state, section).await?;
        }

        self.transition(CrawlPhase::Done)?;
        tracing::info!(
            "Crawl complete: {} products from {} candidates in {:.1}s",
            state.product_count(),
            state.candidate_count(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(state)
    }

    /// Fetches the remaining candidates of one section
    async fn crawl_section(
        &mut self,
        state: CrawlState,
        section: usize,
    ) -> Result<CrawlState, HarvestError> {
        self.transition(CrawlPhase::Admitting)?;

        let entry = &state.sections[section];
        let pending = entry.pending();
        tracing::info!(
            "Section {}/{} ({}): {} of {} candidates remaining",
            section + 1,
            state.sections.len(),
            entry.url,
            pending.len(),
            entry.candidate_urls.len()
        );

        let (tx, rx) = mpsc::channel(self.config.crawler.queue_capacity);
        let collector = Collector::new(
            Arc::clone(&self.store),
            self.config.crawler.checkpoint_interval,
        );
        let collector = tokio::spawn(collector.run(state, section, rx));

        let mut pool = FetchPool::new(
            self.config.crawler.workers,
            Arc::clone(&self.parser),
            Arc::clone(&self.images),
            tx,
        );

        let mut admitted = Ok(());
        for (index, url) in pending {
            if collector.is_finished() {
                tracing::warn!("Collector stopped early, halting admission");
                break;
            }
            if let Err(e) = pool.submit(index, url).await {
                admitted = Err(e);
                break;
            }
        }

        self.transition(CrawlPhase::Draining)?;
        let drained = pool.drain().await;

        // The pool held the last sender, so the collector is now finishing
        let state = collector.await??;
        admitted?;
        let completed = drained?;
        tracing::debug!("Section {} drained after {} fetches", section + 1, completed);

        self.transition(CrawlPhase::Checkpointing)?;
        save_checkpoint(&self.store, state).await
    }
}

/// Runs a complete crawl for `config` and summarizes the result
///
/// # Arguments
///
/// * `config` - The validated crawler configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - Crawl completed successfully
/// * `Err(HarvestError)` - Crawl failed
pub async fn run_crawl(config: Config) -> Result<RunSummary, HarvestError> {
    let mut coordinator = Coordinator::new(config)?;
    let state = coordinator.run().await?;
    Ok(RunSummary::from_state(&state))
}
