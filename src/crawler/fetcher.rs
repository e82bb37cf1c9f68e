//! HTTP fetcher implementation
//!
//! This module handles all HTTP traffic for the crawler:
//! - Building the shared client with user agent and timeouts
//! - Fetching page text and JSON documents
//! - Downloading product images into the run directory
//!
//! Nothing here retries. Network failures are returned to the caller, which
//! decides whether they are recoverable.

use crate::catalog::{ImageRef, ProductRecord};
use crate::config::HttpConfig;
use crate::url::{content_hash, parse_http_url};
use crate::HarvestError;
use futures::future::join_all;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Extension used when the response does not declare a known image type
const DEFAULT_EXTENSION: &str = ".jpg";

/// Builds an HTTP client with proper configuration
///
/// Every request made through the client is bounded by
/// `config.timeout_secs`, so a stalled server cannot hold a fetch slot
/// forever.
///
/// # Example
///
/// ```no_run
/// use shelf_crawler::config::HttpConfig;
/// use shelf_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.timeout_secs);

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns its body as text
///
/// Non-success status codes are errors.
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, HarvestError> {
    let http_error = |source| HarvestError::Http {
        url: url.to_string(),
        source,
    };

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(http_error)?;

    response.text().await.map_err(http_error)
}

/// Fetches a URL and decodes its JSON body
pub async fn fetch_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, HarvestError> {
    let http_error = |source| HarvestError::Http {
        url: url.to_string(),
        source,
    };

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(http_error)?;

    response.json::<T>().await.map_err(http_error)
}

/// Maps a `Content-Type` value to a file extension
pub fn extension_for_content_type(content_type: &str) -> &'static str {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    match mime.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "image/svg+xml" => ".svg",
        "image/avif" => ".avif",
        "image/bmp" => ".bmp",
        "image/tiff" => ".tiff",
        _ => DEFAULT_EXTENSION,
    }
}

/// Downloads product images into `<site dir>/<product id>/`
#[derive(Debug, Clone)]
pub struct ImageDownloader {
    client: Client,
    site_dir: PathBuf,
}

impl ImageDownloader {
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `site_dir` - Directory for this site's images inside the run directory
    pub fn new(client: Client, site_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            site_dir: site_dir.into(),
        }
    }

    /// Directory holding one product's images
    ///
    /// Falls back to a hash of the product URL when the site id is empty or
    /// would escape the site directory.
    pub fn product_dir(&self, product: &ProductRecord) -> PathBuf {
        let pid = product.pid.trim();
        let safe = !pid.is_empty()
            && pid != "."
            && pid != ".."
            && !pid.contains(['/', '\\']);

        if safe {
            self.site_dir.join(pid)
        } else {
            self.site_dir.join(&content_hash(&product.url)[..16])
        }
    }

    /// Downloads every image of `product` concurrently
    ///
    /// All downloads run at once and are awaited together. Unreachable or
    /// malformed images stay unresolved without affecting their siblings;
    /// only a failure to write to disk is returned as an error.
    ///
    /// # Returns
    ///
    /// The number of images stored locally.
    pub async fn download_all(&self, product: &mut ProductRecord) -> Result<usize, HarvestError> {
        let dir = self.product_dir(product);

        let results = join_all(
            product
                .images
                .iter_mut()
                .map(|image| self.download(image, &dir)),
        )
        .await;

        for result in results {
            result?;
        }

        Ok(product.resolved_images())
    }

    /// Downloads one image into `dir`, resolving it on success
    pub async fn download(&self, image: &mut ImageRef, dir: &Path) -> Result<(), HarvestError> {
        let url = match parse_http_url(&image.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Skipping image {:?}: {}", image.url, e);
                return Ok(());
            }
        };

        let response = match self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Image {} unreachable: {}", image.url, e);
                return Ok(());
            }
        };

        let extension = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(extension_for_content_type)
            .unwrap_or(DEFAULT_EXTENSION);

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!("Image {} body failed: {}", image.url, e);
                return Ok(());
            }
        };

        let write_error = |path: &Path| {
            let path = path.to_path_buf();
            move |source| HarvestError::ImageWrite { path, source }
        };

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(write_error(dir))?;

        let path = dir.join(format!("{}{}", content_hash(&image.url), extension));
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(write_error(&path))?;

        tracing::trace!("Stored image {} at {}", image.url, path.display());
        image.resolve(path);
        Ok(())
    }
}
