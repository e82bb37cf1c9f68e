//! Site parsers
//!
//! Every supported target site implements [`SiteParser`]. The parser is
//! resolved once at startup from the configured site name and shared by all
//! fetch tasks; adding a site means adding an implementation and a
//! [`SiteKind`] variant, with no changes to the crawl pipeline.

mod okala;
mod snapp;

pub use okala::{parse_product_page as parse_okala_page, OkalaParser};
pub use snapp::{SnappParser, SnappResponse};

use crate::catalog::{CrawlState, ProductRecord};
use crate::{ConfigError, ConfigResult};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

/// Per-site crawling capability consumed by the pipeline
#[async_trait]
pub trait SiteParser: Send + Sync {
    /// Skeleton crawl state: site identity plus either static sections or a
    /// sitemap index URL
    fn describe(&self) -> CrawlState;

    /// Fetches and extracts one product
    ///
    /// Never fails: on any fetch or parse problem the result is
    /// `ProductRecord::placeholder(url)`.
    async fn fetch_product(&self, url: &str) -> ProductRecord;

    /// Returns true for sitemap entries that are product pages
    fn is_candidate_url(&self, url: &str) -> bool;
}

/// Supported target sites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteKind {
    Okala,
    SnappMarket,
}

impl SiteKind {
    /// Resolves a configured site name
    pub fn from_name(name: &str) -> ConfigResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "okala.com" | "okala" => Ok(Self::Okala),
            "snapp.market" | "snapp" => Ok(Self::SnappMarket),
            other => Err(ConfigError::UnknownSite(other.to_string())),
        }
    }

    /// Canonical site identity, used in checkpoint and image paths
    pub fn name(&self) -> &'static str {
        match self {
            Self::Okala => okala::SITE,
            Self::SnappMarket => snapp::SITE,
        }
    }

    /// Builds the parser for this site
    pub fn parser(&self, client: Client) -> Arc<dyn SiteParser> {
        match self {
            Self::Okala => Arc::new(OkalaParser::new(client)),
            Self::SnappMarket => Arc::new(SnappParser::new(client)),
        }
    }
}
