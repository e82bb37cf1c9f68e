use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Shelf-Crawler
///
/// Built once at startup from an optional TOML file plus command-line
/// overrides, validated, and then shared read-only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Identity of a single crawl run
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Target site name (e.g., "okala.com")
    #[serde(default = "default_site")]
    pub site: String,

    /// Run identifier; reusing one resumes that run's checkpoint
    #[serde(rename = "run-id", default = "default_run_id")]
    pub run_id: i64,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of concurrent product fetches
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Number of collected records between checkpoint writes
    #[serde(rename = "checkpoint-interval", default = "default_checkpoint_interval")]
    pub checkpoint_interval: usize,

    /// Capacity of the channel between fetch tasks and the collector
    #[serde(rename = "queue-capacity", default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory for checkpoints and downloaded images
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl Config {
    /// Directory holding everything written by this run
    pub fn run_dir(&self) -> PathBuf {
        self.output.root.join(self.run.run_id.to_string())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            site: default_site(),
            run_id: default_run_id(),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            checkpoint_interval: default_checkpoint_interval(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

fn default_site() -> String {
    "okala.com".to_string()
}

fn default_run_id() -> i64 {
    chrono::Utc::now().timestamp()
}

fn default_workers() -> usize {
    10
}

fn default_checkpoint_interval() -> usize {
    50
}

fn default_queue_capacity() -> usize {
    10
}

fn default_user_agent() -> String {
    format!("shelf-crawler/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_root() -> PathBuf {
    PathBuf::from("websites")
}
