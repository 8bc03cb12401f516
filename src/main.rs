//! Sumi-Sieve main entry point
//!
//! This is the command-line interface for the Sumi-Sieve image harvester.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use sumi_sieve::config::{load_config_with_hash, CrawlConfig};
use sumi_sieve::crawler::seed_manual;
use sumi_sieve::output::print_report;
use sumi_sieve::Controller;
use tracing_subscriber::EnvFilter;

/// Sumi-Sieve: a site-scoped image harvester
///
/// Sumi-Sieve crawls a website breadth-first from a start URL, collects every
/// image referenced by the pages it visits, and downloads them to a folder.
/// Press Ctrl-C once for a graceful stop.
#[derive(Parser, Debug)]
#[command(name = "sumi-sieve")]
#[command(version = "1.0.0")]
#[command(about = "A site-scoped image harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

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
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

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
            0 => EnvFilter::new("sumi_sieve=info,warn"),
            1 => EnvFilter::new("sumi_sieve=debug,info"),
            2 => EnvFilter::new("sumi_sieve=trace,debug"),
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

/// Handles the --dry-run mode: shows the resolved configuration and seeds
fn handle_dry_run(config: &CrawlConfig) {
    println!("=== Sumi-Sieve Dry Run ===\n");

    let crawler = &config.crawler;
    println!("Crawler Configuration:");
    println!("  Start URL: {}", crawler.start_url);
    println!("  Max depth: {}", crawler.max_depth);
    println!("  Workers: {}", crawler.workers);
    println!("  Include subdomains: {}", crawler.include_subdomains);
    println!("  Include external: {}", crawler.include_external);
    println!("  Subdomain match: {:?}", crawler.subdomain_match);
    println!("  Auto pagination: {}", crawler.auto_pagination);
    println!("  Page timeout: {}s", crawler.page_timeout_secs);
    println!("  User agent: {}", crawler.user_agent);

    println!("\nDownload:");
    println!("  Output directory: {}", config.download.output_dir);
    println!("  Concurrency: {}", config.download.concurrency);
    println!("  Timeout: {}s", config.download.timeout_secs);
    println!("  Manifest: {}", config.download.manifest);

    let mut seed_count = 1;
    if let Some(pagination) = &config.pagination {
        println!("\nManual Pagination:");
        match seed_manual(pagination) {
            Ok(tasks) => {
                println!("  {} pages from {}", tasks.len(), pagination.pattern);
                for task in tasks.iter().take(5) {
                    println!("    * {}", task.url);
                }
                if tasks.len() > 5 {
                    println!("    ... and {} more", tasks.len() - 5);
                }
                seed_count += tasks.len();
            }
            Err(e) => println!("  ! {} (will be ignored)", e),
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling with {} seed URLs", seed_count);
}

/// Handles the main crawl operation
async fn handle_crawl(config: CrawlConfig) -> Result<()> {
    let controller = Controller::default();
    let handle = controller.start(config).context("Failed to start crawl")?;

    // First Ctrl-C requests a graceful stop
    let signal_controller = controller.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_controller.stop();
        }
    });

    let report = handle.wait().await.context("Crawl task failed")?;
    print_report(&report);

    Ok(())
}
