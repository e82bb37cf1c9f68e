use crate::catalog::ProductRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// One sitemap section: its candidate URLs, collected products, and cursor
///
/// Every candidate below `resume_position` has been processed; it never
/// exceeds `candidate_urls.len()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Sitemap document URL this section was read from
    pub url: String,

    /// Product URLs that passed the site's candidate filter, in sitemap order
    pub candidate_urls: Vec<String>,

    /// Valid products collected so far, in arrival order
    pub products: Vec<ProductRecord>,

    pub resume_position: usize,
}

impl CatalogEntry {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Candidates still to fetch, paired with their index
    ///
    /// Starts at the cursor and leaves out candidates whose product is already
    /// collected. A checkpoint written while earlier candidates were still in
    /// flight holds products from beyond the cursor.
    pub fn pending(&self) -> Vec<(usize, String)> {
        let collected: HashSet<&str> = self.products.iter().map(|p| p.url.as_str()).collect();
        let start = self.resume_position.min(self.candidate_urls.len());

        self.candidate_urls[start..]
            .iter()
            .enumerate()
            .filter(|(_, url)| !collected.contains(url.as_str()))
            .map(|(offset, url)| (start + offset, url.clone()))
            .collect()
    }

    /// Returns true once every candidate has been processed
    pub fn is_complete(&self) -> bool {
        self.resume_position >= self.candidate_urls.len()
    }

    /// Records candidate `index` as processed
    ///
    /// `finished` holds processed indices at or beyond the cursor. The cursor
    /// moves over every contiguous processed candidate, so everything below
    /// it is done even when records arrive out of order. It never exceeds
    /// the candidate count.
    pub fn complete(&mut self, index: usize, finished: &mut BTreeSet<usize>) {
        if index >= self.resume_position && index < self.candidate_urls.len() {
            finished.insert(index);
        }
        while finished.remove(&self.resume_position) {
            self.resume_position += 1;
        }
    }
}

/// Root persisted object for one target site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlState {
    /// Target identity (e.g., "okala.com")
    pub site: String,

    /// Sitemap index used to discover sections, if the site has one
    pub sitemap_index_url: Option<String>,

    pub sections: Vec<CatalogEntry>,
}

impl CrawlState {
    pub fn new(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            ..Self::default()
        }
    }

    /// Total candidate URLs across all sections
    pub fn candidate_count(&self) -> usize {
        self.sections.iter().map(|s| s.candidate_urls.len()).sum()
    }

    /// Total accumulated products across all sections
    pub fn product_count(&self) -> usize {
        self.sections.iter().map(|s| s.products.len()).sum()
    }
}
