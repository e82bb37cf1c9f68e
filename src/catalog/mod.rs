//! Catalog model for a crawl target
//!
//! `CrawlState` is the root object persisted in checkpoints. It owns one
//! `CatalogEntry` per sitemap section, each of which owns its collected
//! `ProductRecord`s and their `ImageRef`s.

mod entry;
mod product;

pub use entry::{CatalogEntry, CrawlState};
pub use product::{ImageRef, ProductRecord};
