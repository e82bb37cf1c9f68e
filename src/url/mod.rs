//! URL handling module for Shelf-Crawler
//!
//! This module provides host and path extraction, syntactic validation of
//! fetchable URLs, and content-addressed file names.

mod domain;

use crate::{UrlError, UrlResult};
use sha2::{Digest, Sha256};
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, path_key, path_segments};

/// Parses a URL and checks that it can be fetched over HTTP(S)
///
/// Image URLs failing this check are skipped without a request.
///
/// # Examples
///
/// ```
/// use shelf_crawler::url::parse_http_url;
///
/// assert!(parse_http_url("https://cdn.example.com/a.jpg").is_ok());
/// assert!(parse_http_url("").is_err());
/// assert!(parse_http_url("ftp://example.com/a.jpg").is_err());
/// ```
pub fn parse_http_url(raw: &str) -> UrlResult<Url> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::InvalidScheme(other.to_string())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Hex-encoded SHA-256 of a URL, used as a stable file name
pub fn content_hash(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
