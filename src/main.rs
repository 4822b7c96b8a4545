//! fma-warnings main entry point
//!
//! This is the command-line interface for the FMA warnings crawler.

use anyhow::Context;
use clap::Parser;
use fma_warnings::config::{load_config_with_hash, validate, Config};
use fma_warnings::crawler::crawl;
use fma_warnings::output::print_report;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// fma-warnings: crawls the FMA warnings and alerts listing
///
/// Walks every page of the listing, follows each warning's detail link
/// and writes the warning's text to one JSON file per warning.
#[derive(Parser, Debug)]
#[command(name = "fma-warnings")]
#[command(version)]
#[command(about = "Crawls the FMA warnings and alerts listing", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of list pages to crawl instead of reading the live result count
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pages: Option<u32>,

    /// Directory receiving the JSON records
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("fma_warnings=info,warn"),
            1 => EnvFilter::new("fma_warnings=debug,info"),
            2 => EnvFilter::new("fma_warnings=trace,debug"),
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

/// Loads the config file (or defaults), applies CLI overrides and validates the result
fn load(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(pages) = cli.pages {
        config.crawler.pages = Some(pages);
    }

    if let Some(output) = &cli.output {
        config.output.data_directory = output.display().to_string();
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== fma-warnings Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  List URL: {}", config.crawler.list_url);
    println!("  First page: {}", config.crawler.list_page_url(1));
    println!("  Allowed domains: {}", config.crawler.allowed_domains.join(", "));
    println!("  Page size: {}", config.crawler.page_size);
    match config.crawler.pages {
        Some(pages) => println!("  Pages: {} (override)", pages),
        None => println!("  Pages: from live result count"),
    }
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Download delay: {}ms", config.crawler.download_delay_ms);
    println!(
        "  Concurrent requests per domain: {}",
        config.crawler.concurrent_requests_per_domain
    );
    println!("  Max in flight: {}", config.crawler.max_in_flight);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Data directory: {}", config.output.data_directory);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, finishing in-flight requests");
                cancel.cancel();
            }
        });
    }

    match crawl(config, cancel).await {
        Ok(report) => {
            tracing::info!("Crawl completed successfully");
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
