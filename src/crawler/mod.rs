//! Crawler module for catalog discovery and product fetching
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching of pages, API documents and images
//! - Sitemap parsing and section discovery
//! - The admission-controlled fetch pool
//! - The result collector that owns and checkpoints the crawl state
//! - Overall crawl coordination

mod collector;
mod coordinator;
mod fetcher;
mod pool;
mod sitemap;

pub use collector::Collector;
pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{
    build_http_client, extension_for_content_type, fetch_json, fetch_text, ImageDownloader,
};
pub use pool::{FetchPool, Fetched};
pub use sitemap::{discover, fetch_sitemap, parse_sitemap, Sitemap, SitemapKind};
