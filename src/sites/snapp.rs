//! snapp.market products
//!
//! Sections are discovered from a sitemap index; product data comes from the
//! vendor JSON API rather than the HTML page.

use crate::catalog::{CrawlState, ImageRef, ProductRecord};
use crate::crawler::fetch_json;
use crate::sites::SiteParser;
use crate::url::path_segments;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

pub(crate) const SITE: &str = "snapp.market";
const SITEMAP_INDEX_URL: &str = "https://core.snapp.market/sitemap.xml";
const API_BASE: &str = "https://core.snapp.market";
const VENDOR: &str = "0r5ryz";

/// Product API response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnappResponse {
    pub product: SnappProduct,
    #[serde(default)]
    pub breadcrumb: Vec<SnappCategory>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SnappProduct {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    /// List price before discount
    pub price: i64,
    pub discounted_price: i64,
    pub images: Vec<SnappImage>,
    /// Either a plain name or an object with a `title`
    pub brand: Option<Value>,
    pub html_description: Option<String>,
    pub meta_description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SnappImage {
    pub image: String,
    pub thumb: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SnappCategory {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

pub struct SnappParser {
    client: Client,
    sitemap_index_url: String,
    api_base: String,
}

impl SnappParser {
    pub fn new(client: Client) -> Self {
        Self::with_endpoints(client, SITEMAP_INDEX_URL, API_BASE)
    }

    /// Creates a parser against other sitemap and API hosts
    pub fn with_endpoints(
        client: Client,
        sitemap_index_url: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            sitemap_index_url: sitemap_index_url.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn api_url(&self, id: &str) -> String {
        format!(
            "{}/api/v1/vendors/{}/products/{}",
            self.api_base, VENDOR, id
        )
    }
}

#[async_trait]
impl SiteParser for SnappParser {
    fn describe(&self) -> CrawlState {
        CrawlState {
            site: SITE.to_string(),
            sitemap_index_url: Some(self.sitemap_index_url.clone()),
            sections: Vec::new(),
        }
    }

    async fn fetch_product(&self, url: &str) -> ProductRecord {
        let Some(id) = product_id(url) else {
            tracing::warn!("No product id in {}", url);
            return ProductRecord::placeholder(url);
        };

        match fetch_json::<SnappResponse>(&self.client, &self.api_url(&id)).await {
            Ok(response) => into_record(response, url),
            Err(e) => {
                tracing::warn!("Failed to fetch product {}: {}", url, e);
                ProductRecord::placeholder(url)
            }
        }
    }

    fn is_candidate_url(&self, url: &str) -> bool {
        url.contains("products")
    }
}

/// Product id from a page URL: the first all-digit path segment, otherwise
/// the third segment
fn product_id(url: &str) -> Option<String> {
    let segments = path_segments(url);
    segments
        .iter()
        .find(|s| s.chars().all(|c| c.is_ascii_digit()))
        .or_else(|| segments.get(2))
        .cloned()
}

fn brand_name(brand: Option<&Value>) -> String {
    match brand {
        Some(Value::String(name)) => name.clone(),
        Some(Value::Object(fields)) => fields
            .get("title")
            .or_else(|| fields.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

/// Maps an API response onto a product record
pub(crate) fn into_record(response: SnappResponse, url: &str) -> ProductRecord {
    let product = response.product;

    ProductRecord {
        url: url.to_string(),
        pid: product.id.to_string(),
        title: product.title.unwrap_or_default().trim().to_string(),
        description: product.description.unwrap_or_default(),
        short_description: product.html_description.unwrap_or_default(),
        brand: brand_name(product.brand.as_ref()),
        price: product.discounted_price.to_string(),
        old_price: product.price.to_string(),
        category: response.breadcrumb.into_iter().map(|c| c.title).collect(),
        json_meta: "{}".to_string(),
        content: product.content.unwrap_or_default(),
        parsed_at: Some(Utc::now()),
        images: product
            .images
            .into_iter()
            .map(|image| ImageRef::new(image.image))
            .collect(),
    }
}
