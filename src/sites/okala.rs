//! okala.com product pages
//!
//! Sections come from a single static sitemap. Product pages are addressed by
//! a numeric path and scraped with CSS selectors.

use crate::catalog::{CatalogEntry, CrawlState, ImageRef, ProductRecord};
use crate::crawler::fetch_text;
use crate::sites::SiteParser;
use crate::url::path_key;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

pub(crate) const SITE: &str = "okala.com";
const SITEMAP_URL: &str = "https://okala.com/sitemap.xml";

const TITLE: &str = ".h4.line-height-sm.font-weight-bold";
const DESCRIPTION: &str = ".subtitle2.text-muted";
const PRICE_LIST: &str =
    ".description-list.description-list-horizontal.description-list-horizontal-sm.mb-0";
const ATTRIBUTES: &str = ".description-list.description-list-horizontal:not(.mb-0)";
const CONTENT: &str = "#description";
const GALLERY_IMAGES: &str = ".gallery-top img";
const BREADCRUMB: &str = ".breadcrumb";

/// Attribute label marking the brand row ("brand" in Persian)
const BRAND_LABEL: &str = "برند";

pub struct OkalaParser {
    client: Client,
    sitemap_url: String,
}

impl OkalaParser {
    pub fn new(client: Client) -> Self {
        Self::with_sitemap(client, SITEMAP_URL)
    }

    /// Creates a parser reading its section from another sitemap location
    pub fn with_sitemap(client: Client, sitemap_url: impl Into<String>) -> Self {
        Self {
            client,
            sitemap_url: sitemap_url.into(),
        }
    }
}

#[async_trait]
impl SiteParser for OkalaParser {
    fn describe(&self) -> CrawlState {
        CrawlState {
            site: SITE.to_string(),
            sitemap_index_url: None,
            sections: vec![CatalogEntry::new(self.sitemap_url.clone())],
        }
    }

    async fn fetch_product(&self, url: &str) -> ProductRecord {
        match fetch_text(&self.client, url).await {
            Ok(html) => parse_product_page(&html, url),
            Err(e) => {
                tracing::warn!("Failed to fetch product {}: {}", url, e);
                ProductRecord::placeholder(url)
            }
        }
    }

    fn is_candidate_url(&self, url: &str) -> bool {
        path_key(url)
            .map(|key| !key.is_empty() && key.chars().all(|c| c.is_ascii_digit()))
            .unwrap_or(false)
    }
}

/// Extracts a product record from an okala.com product page
///
/// Missing elements yield empty fields; a page without a title produces an
/// invalid record.
pub fn parse_product_page(html: &str, url: &str) -> ProductRecord {
    let document = Html::parse_document(html);
    let base = Url::parse(url).ok();

    let attributes = extract_attributes(&document);
    let brand = attributes
        .iter()
        .find(|(label, _)| label.contains(BRAND_LABEL))
        .map(|(_, value)| strip_tags(value))
        .unwrap_or_default();
    let json_meta = serde_json::to_string(
        &attributes
            .iter()
            .map(|(label, value)| [label.as_str(), value.as_str()])
            .collect::<Vec<_>>(),
    )
    .unwrap_or_else(|_| "[]".to_string());

    ProductRecord {
        url: url.to_string(),
        pid: path_key(url).unwrap_or_default(),
        title: first_text(&document, TITLE),
        description: first_text(&document, DESCRIPTION),
        short_description: String::new(),
        brand,
        price: all_text(&document, &format!("{} .text-primary span", PRICE_LIST)),
        old_price: first_text(&document, &format!("{} .text-muted del", PRICE_LIST)),
        category: extract_categories(&document),
        json_meta,
        content: first_inner_html(&document, CONTENT),
        parsed_at: Some(Utc::now()),
        images: extract_images(&document, base.as_ref()),
    }
}

fn first_element<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_text(document: &Html, selector: &str) -> String {
    first_element(document, selector)
        .map(element_text)
        .unwrap_or_default()
}

fn first_inner_html(document: &Html, selector: &str) -> String {
    first_element(document, selector)
        .map(|element| element.inner_html().trim().to_string())
        .unwrap_or_default()
}

fn all_text(document: &Html, selector: &str) -> String {
    let Ok(selector) = Selector::parse(selector) else {
        return String::new();
    };
    document
        .select(&selector)
        .map(element_text)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Label/value markup pairs from the first attribute list
fn extract_attributes(document: &Html) -> Vec<(String, String)> {
    let Some(list) = first_element(document, ATTRIBUTES) else {
        return Vec::new();
    };

    let cells: Vec<String> = list
        .children()
        .filter_map(ElementRef::wrap)
        .map(|cell| cell.inner_html().trim().to_string())
        .collect();

    cells
        .chunks_exact(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect()
}

fn strip_tags(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    fragment
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}

fn extract_images(document: &Html, base: Option<&Url>) -> Vec<ImageRef> {
    let Ok(selector) = Selector::parse(GALLERY_IMAGES) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|img| img.value().attr("data-zoom-image"))
        .map(|src| {
            let src = src.trim();
            let resolved = match base {
                Some(base) if src.starts_with('/') => base
                    .join(src)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| src.to_string()),
                _ => src.to_string(),
            };
            ImageRef::new(resolved)
        })
        .collect()
}

/// Breadcrumb labels without the trailing crumb (the product itself)
fn extract_categories(document: &Html) -> Vec<String> {
    let (Some(breadcrumb), Ok(link)) = (
        first_element(document, BREADCRUMB),
        Selector::parse("a"),
    ) else {
        return Vec::new();
    };

    let mut categories: Vec<String> = breadcrumb
        .children()
        .filter_map(ElementRef::wrap)
        .map(|crumb| crumb.select(&link).map(element_text).collect::<String>())
        .collect();
    categories.pop();
    categories
}
