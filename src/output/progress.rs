//! Per-record progress observation

use std::fmt;

/// Snapshot emitted by the collector after every record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Records processed in the current section, counting resumed ones
    pub processed: usize,

    /// Candidate URLs in the current section
    pub candidates: usize,

    /// Valid products accumulated in the current section
    pub accumulated: usize,
}

impl Progress {
    /// Share of the section processed, in percent
    pub fn percent(&self) -> f64 {
        if self.candidates == 0 {
            return 100.0;
        }
        (self.processed as f64 / self.candidates as f64) * 100.0
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Progress: {}/{} candidates ({:.1}%), {} accumulated",
            self.processed,
            self.candidates,
            self.percent(),
            self.accumulated
        )
    }
}
