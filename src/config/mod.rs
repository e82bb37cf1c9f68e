//! Configuration module for Shelf-Crawler
//!
//! This module handles loading, parsing, and validating the run
//! configuration. Values come from an optional TOML file and are overridden
//! by command-line flags; the validated result is immutable for the rest of
//! the run.
//!
//! # Example
//!
//! ```no_run
//! use shelf_crawler::config::{resolve_config, Overrides};
//!
//! let config = resolve_config(None, Overrides::default()).unwrap();
//! println!("Crawling {} with {} workers", config.run.site, config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, OutputConfig, RunConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config, resolve_config, Overrides};
pub use validation::validate;
