//! Lifecycle phases of one crawl run
//!
//! The orchestrator moves through `Discovering`, then loops over
//! `Admitting -> Draining -> Checkpointing` once per section with work,
//! and finishes in `Done`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Loading the checkpoint or discovering sections from sitemaps
    Discovering,

    /// Submitting a section's remaining candidates to the fetch pool
    Admitting,

    /// Waiting for in-flight fetches and the collector to finish
    Draining,

    /// Writing the end-of-section checkpoint
    Checkpointing,

    /// Every section processed
    Done,
}

impl CrawlPhase {
    /// Returns true if `next` is a legal successor of this phase
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Discovering, Self::Admitting)
                | (Self::Discovering, Self::Done)
                | (Self::Admitting, Self::Draining)
                | (Self::Draining, Self::Checkpointing)
                | (Self::Checkpointing, Self::Admitting)
                | (Self::Checkpointing, Self::Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovering => "discovering",
            Self::Admitting => "admitting",
            Self::Draining => "draining",
            Self::Checkpointing => "checkpointing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
