use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads, parses, and validates a configuration file
///
/// Missing sections and keys fall back to their defaults, so an empty file
/// is a valid configuration.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use shelf_crawler::config::load_config;
///
/// let config = load_config(Path::new("crawler.toml")).unwrap();
/// println!("Workers: {}", config.crawler.workers);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Parses configuration from TOML text without validating it
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Command-line values that take precedence over the configuration file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub site: Option<String>,
    pub run_id: Option<i64>,
    pub workers: Option<usize>,
    pub output_root: Option<std::path::PathBuf>,
}

/// Builds the final configuration for a run
///
/// Reads `path` if given (defaults otherwise), applies `overrides`, and
/// validates the result. The returned value is meant to be shared read-only.
pub fn resolve_config(path: Option<&Path>, overrides: Overrides) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&std::fs::read_to_string(path)?)?,
        None => Config::default(),
    };

    if let Some(site) = overrides.site {
        config.run.site = site;
    }
    if let Some(run_id) = overrides.run_id {
        config.run.run_id = run_id;
    }
    if let Some(workers) = overrides.workers {
        config.crawler.workers = workers;
    }
    if let Some(root) = overrides.output_root {
        config.output.root = root;
    }

    validate(&config)?;
    Ok(config)
}
