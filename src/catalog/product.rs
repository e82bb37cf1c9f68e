use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One product image
///
/// `local_path` and `downloaded_at` stay unset until the image has been
/// written to disk; an unreachable or malformed source leaves them unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    pub local_path: Option<PathBuf>,
    pub downloaded_at: Option<DateTime<Utc>>,
}

impl ImageRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            local_path: None,
            downloaded_at: None,
        }
    }

    /// Returns true once the image has been stored locally
    pub fn is_resolved(&self) -> bool {
        self.local_path.is_some()
    }

    /// Records a successful download
    pub fn resolve(&mut self, path: PathBuf) {
        self.local_path = Some(path);
        self.downloaded_at = Some(Utc::now());
    }
}

/// The extracted result for one product URL
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Source page URL
    pub url: String,

    /// Stable product identifier on the target site
    pub pid: String,

    pub title: String,
    pub description: String,
    pub short_description: String,
    pub brand: String,

    pub price: String,
    pub old_price: String,

    /// Breadcrumb path, outermost category first
    pub category: Vec<String>,

    /// Free-form site metadata encoded as JSON text
    pub json_meta: String,

    /// Raw description markup
    pub content: String,

    pub parsed_at: Option<DateTime<Utc>>,

    pub images: Vec<ImageRef>,
}

impl ProductRecord {
    /// Builds the record returned when a page cannot be fetched or parsed
    ///
    /// The empty title marks it invalid, so the collector counts it toward
    /// progress without accumulating it.
    pub fn placeholder(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// A record is valid when its title is non-empty
    ///
    /// Site parsers trim the titles they extract, so whitespace never
    /// reaches this check from a parsed page.
    pub fn is_valid(&self) -> bool {
        !self.title.is_empty()
    }

    /// Number of images stored locally
    pub fn resolved_images(&self) -> usize {
        self.images.iter().filter(|image| image.is_resolved()).count()
    }
}
