//! State module for tracking crawl progress
//!
//! `CrawlPhase` is the orchestrator's lifecycle; per-section progress lives
//! in the catalog (`CatalogEntry::resume_position`).

mod phase;

pub use phase::CrawlPhase;
