//! Kumo main entry point
//!
//! Command-line front-end for the concurrent scrape-and-retry engine.

use clap::Parser;
use kumo::config::{load_config_with_hash, ScrapeConfig};
use kumo::output::{print_report, JsonSink};
use kumo::parse::parser_from_config;
use kumo::{HttpFetcher, Scraper};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Kumo: a concurrent scrape-and-retry engine
///
/// Kumo fetches a set of URLs with a bounded worker pool, parses the
/// responses into records, and retries failed jobs round after round until
/// the set converges or stops making progress. Results and error records
/// are written as JSON files under the configured output directory.
#[derive(Parser, Debug)]
#[command(name = "kumo")]
#[command(version)]
#[command(about = "A concurrent scrape-and-retry engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Additional seed URLs, appended to the config's seeds
    #[arg(long = "url", value_name = "URL")]
    urls: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be scraped without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, &cli.urls);
        return Ok(());
    }

    handle_scrape(config, cli.urls).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kumo=info,warn"),
            1 => EnvFilter::new("kumo=debug,info"),
            2 => EnvFilter::new("kumo=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the plan
fn handle_dry_run(config: &ScrapeConfig, extra_urls: &[String]) {
    println!("=== Kumo Dry Run ===\n");

    println!("Job:");
    println!("  Name: {}", config.job.name);
    println!("  Output dir: {}", config.job.output_dir.display());

    println!("\nRunner:");
    println!("  Concurrency: {}", config.runner.concurrency);
    println!("  Timeout: {}s", config.runner.timeout_secs);
    println!("  User agent: {}", config.runner.user_agent);

    println!("\nParse:");
    println!("  Mode: {:?}", config.parse.mode);
    if let Some(selector) = &config.parse.selector {
        println!("  Selector: {}", selector);
    }

    println!("\nSeeds ({}):", config.seeds.len() + extra_urls.len());
    for seed in config.seeds.iter().chain(extra_urls) {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would scrape {} URLs with {} workers",
        config.seeds.len() + extra_urls.len(),
        config.runner.concurrency
    );
}

/// Handles the main scrape operation
async fn handle_scrape(
    config: ScrapeConfig,
    extra_urls: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let seed_count = config.seeds.len() + extra_urls.len();
    if seed_count == 0 {
        tracing::warn!("no seed URLs configured, nothing to do");
        return Ok(());
    }

    tracing::info!(
        "Starting job '{}' with {} seed URLs, {} workers, {}s timeout",
        config.job.name,
        seed_count,
        config.runner.concurrency,
        config.runner.timeout_secs
    );

    let fetcher = Arc::new(HttpFetcher::new(&config.runner.user_agent)?);
    let parser = parser_from_config(&config.parse)?;
    let sink = Arc::new(JsonSink::new(config.job.output_dir.clone()));

    let mut scraper = Scraper::new(&config, fetcher, parser, sink);
    scraper.urls_with(config.seeds.clone()).urls_with(extra_urls);

    let result = scraper.run_until_done().await;
    scraper.shutdown().await;

    match result {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            Err(e.into())
        }
    }
}
