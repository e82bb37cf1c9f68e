//! Output module for crawl progress and summaries
//!
//! This module handles:
//! - The progress line emitted for every collected record
//! - Deriving and printing the end-of-run summary

mod progress;
mod summary;

pub use progress::Progress;
pub use summary::{print_summary, RunSummary};
