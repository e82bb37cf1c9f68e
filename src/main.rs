//! Shelf-Crawler main entry point
//!
//! This is the command-line interface for the Shelf-Crawler catalog
//! downloader.

use anyhow::Context;
use clap::Parser;
use shelf_crawler::config::{resolve_config, Config, Overrides};
use shelf_crawler::crawler::run_crawl;
use shelf_crawler::output::print_summary;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shelf-Crawler: a resumable catalog downloader
///
/// Shelf-Crawler discovers product pages from a site's sitemaps, downloads
/// every product and its images with bounded concurrency, and checkpoints
/// progress so an interrupted run resumes where it stopped. Rerun with the
/// same --uid to resume.
#[derive(Parser, Debug)]
#[command(name = "shelf-crawler")]
#[command(version)]
#[command(about = "A resumable catalog downloader", long_about = None)]
struct Cli {
    /// Target site (okala.com or snapp.market)
    #[arg(long)]
    site: Option<String>,

    /// Run id; defaults to the current Unix timestamp
    #[arg(long = "uid", value_name = "RUN_ID")]
    run_id: Option<i64>,

    /// Maximum concurrent product fetches
    #[arg(long)]
    workers: Option<usize>,

    /// Output root directory
    #[arg(long = "path", value_name = "DIR")]
    output_root: Option<PathBuf>,

    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let overrides = Overrides {
        site: cli.site,
        run_id: cli.run_id,
        workers: cli.workers,
        output_root: cli.output_root,
    };

    let config = resolve_config(cli.config.as_deref(), overrides)
        .context("Failed to load configuration")?;
    log_config(&config);

    let run_dir = config.run_dir();
    let summary = run_crawl(config)
        .await
        .with_context(|| format!("Crawl failed (run directory {})", run_dir.display()))?;

    if !cli.quiet {
        print_summary(&summary);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_crawler=info,warn"),
            1 => EnvFilter::new("shelf_crawler=debug,info"),
            2 => EnvFilter::new("shelf_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn log_config(config: &Config) {
    tracing::info!(
        "Site: {}, run id: {}, workers: {}",
        config.run.site,
        config.run.run_id,
        config.crawler.workers
    );
    tracing::info!(
        "Checkpoint every {} records, queue capacity {}",
        config.crawler.checkpoint_interval,
        config.crawler.queue_capacity
    );
    tracing::info!("Output directory: {}", config.run_dir().display());
}
