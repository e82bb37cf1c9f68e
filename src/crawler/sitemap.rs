//! Sitemap discovery
//!
//! Reads sitemap and sitemap-index XML documents and turns them into the
//! sections of a fresh crawl state. Only `<loc>` elements are read; every
//! other element is ignored.

use crate::catalog::{CatalogEntry, CrawlState};
use crate::crawler::fetch_text;
use crate::sites::SiteParser;
use crate::url::extract_domain;
use crate::HarvestError;
use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;
use reqwest::Client;

/// Kind of sitemap document, decided by its root element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitemapKind {
    /// `<urlset>`: locations are pages
    UrlSet,
    /// `<sitemapindex>`: locations are other sitemaps
    Index,
}

/// Parsed sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sitemap {
    pub kind: SitemapKind,
    /// `<loc>` values in document order
    pub locations: Vec<String>,
}

/// Parses a sitemap or sitemap-index document
///
/// # Arguments
///
/// * `url` - Where the document came from, used in error messages
/// * `xml` - The document body
///
/// # Returns
///
/// * `Ok(Sitemap)` - All `<loc>` values, trimmed, empty ones dropped
/// * `Err(HarvestError::SitemapParse)` - The document is not well-formed XML
pub fn parse_sitemap(url: &str, xml: &str) -> Result<Sitemap, HarvestError> {
    let parse_error = |message: String| HarvestError::SitemapParse {
        url: url.to_string(),
        message,
    };

    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut in_loc = false;
    let mut kind = SitemapKind::UrlSet;
    let mut locations = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(XmlEvent::Start(e)) => match e.local_name().as_ref() {
                b"sitemapindex" => kind = SitemapKind::Index,
                b"loc" => in_loc = true,
                _ => {}
            },
            Ok(XmlEvent::End(e)) => {
                if e.local_name().as_ref() == b"loc" {
                    in_loc = false;
                }
            }
            Ok(XmlEvent::Text(t)) if in_loc => {
                let text = t.unescape().map_err(|e| parse_error(e.to_string()))?;
                push_location(&mut locations, &text);
            }
            Ok(XmlEvent::CData(t)) if in_loc => {
                push_location(&mut locations, &String::from_utf8_lossy(&t));
            }
            Ok(XmlEvent::Eof) => break,
            Err(e) => {
                return Err(parse_error(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(Sitemap { kind, locations })
}

fn push_location(locations: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        locations.push(text.to_string());
    }
}

/// Fetches and parses one sitemap document
pub async fn fetch_sitemap(client: &Client, url: &str) -> Result<Sitemap, HarvestError> {
    let body = fetch_text(client, url).await?;
    parse_sitemap(url, &body)
}

/// Builds a fresh crawl state for `parser`'s site
///
/// Starts from the parser's skeleton. When it names a sitemap index, every
/// sitemap listed there on the index's own host becomes a section, replacing
/// any static sections. Each section's candidate list is then filled from
/// its sitemap, keeping only URLs the parser accepts.
///
/// Discovery never fails: an unreachable or malformed document is logged and
/// contributes nothing, leaving an empty section that the crawl skips.
pub async fn discover(client: &Client, parser: &dyn SiteParser) -> CrawlState {
    let mut state = parser.describe();

    if let Some(index_url) = state.sitemap_index_url.clone() {
        match fetch_sitemap(client, &index_url).await {
            Ok(index) => {
                if index.kind != SitemapKind::Index {
                    tracing::warn!("{} is not a sitemap index", index_url);
                }
                let host = extract_domain(&index_url);
                state.sections = index
                    .locations
                    .into_iter()
                    .filter(|loc| {
                        let same_host = extract_domain(loc) == host;
                        if !same_host {
                            tracing::warn!("Ignoring off-site sitemap {}", loc);
                        }
                        same_host
                    })
                    .map(CatalogEntry::new)
                    .collect();
            }
            Err(e) => {
                tracing::warn!("Failed to read sitemap index {}: {}", index_url, e);
                state.sections.clear();
            }
        }
        tracing::info!("Sitemap index lists {} sections", state.sections.len());
    }

    for section in &mut state.sections {
        match fetch_sitemap(client, &section.url).await {
            Ok(sitemap) => {
                let total = sitemap.locations.len();
                section.candidate_urls = sitemap
                    .locations
                    .into_iter()
                    .filter(|url| parser.is_candidate_url(url))
                    .collect();
                tracing::info!(
                    "Section {}: {} of {} locations are products",
                    section.url,
                    section.candidate_urls.len(),
                    total
                );
            }
            Err(e) => {
                tracing::warn!("Failed to read sitemap {}: {}", section.url, e);
            }
        }
    }

    state
}
