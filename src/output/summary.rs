//! End-of-run summary
//!
//! This module derives the final counts of a crawl from its state and prints
//! them for the operator.

use crate::catalog::CrawlState;

/// Counts describing a finished (or resumed and finished) run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Target site identity
    pub site: String,

    /// Sections discovered from sitemap data
    pub sections: usize,

    /// Sections with no candidate URLs
    pub empty_sections: usize,

    /// Candidate product URLs across all sections
    pub candidates: usize,

    /// Candidates processed so far (sum of resume cursors)
    pub processed: usize,

    /// Valid products accumulated
    pub products: usize,

    /// Processed candidates that produced no valid product
    pub invalid: usize,

    /// Images stored locally
    pub images_resolved: usize,

    /// Images that could not be fetched
    pub images_unresolved: usize,
}

impl RunSummary {
    /// Derives the summary from a crawl state
    pub fn from_state(state: &CrawlState) -> Self {
        let mut summary = Self {
            site: state.site.clone(),
            sections: state.sections.len(),
            ..Self::default()
        };

        for section in &state.sections {
            if section.candidate_urls.is_empty() {
                summary.empty_sections += 1;
            }
            summary.candidates += section.candidate_urls.len();
            summary.processed += section.resume_position;
            summary.products += section.products.len();

            for product in &section.products {
                let resolved = product.resolved_images();
                summary.images_resolved += resolved;
                summary.images_unresolved += product.images.len() - resolved;
            }
        }

        summary.invalid = summary.processed.saturating_sub(summary.products);
        summary
    }

    /// Returns true when every candidate has been processed
    pub fn is_complete(&self) -> bool {
        self.processed >= self.candidates
    }
}

/// Prints a run summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The summary to display
pub fn print_summary(summary: &RunSummary) {
    println!("=== Crawl Summary: {} ===\n", summary.site);

    println!("Sections:");
    println!("  Discovered: {}", summary.sections);
    println!("  Empty: {}", summary.empty_sections);
    println!();

    println!("Products:");
    println!("  Candidates: {}", summary.candidates);
    println!("  Processed: {}", summary.processed);
    println!("  Accumulated: {}", summary.products);
    println!("  Invalid: {}", summary.invalid);
    println!();

    let total_images = summary.images_resolved + summary.images_unresolved;
    let image_rate = if total_images > 0 {
        (summary.images_resolved as f64 / total_images as f64) * 100.0
    } else {
        0.0
    };
    println!("Images:");
    println!("  Stored: {}", summary.images_resolved);
    println!("  Unresolved: {}", summary.images_unresolved);
    println!();

    println!(
        "Image Success Rate: {:.1}% ({} / {} images stored)",
        image_rate, summary.images_resolved, total_images
    );

    if !summary.is_complete() {
        println!(
            "\nRun incomplete: {} candidates left, rerun with the same --uid to resume",
            summary.candidates - summary.processed
        );
    }
}
