//! Sumi-Scout main entry point
//!
//! This is the command-line interface for the Sumi-Scout contact finder.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sumi_scout::config::{load_config_with_hash, Config};
use sumi_scout::crawler::{build_http_client, ConnectivityProbe, HttpFetcher, PageFetcher, TcpProbe};
use sumi_scout::input::load_entities;
use sumi_scout::output::{print_statistics, read_statistics};
use sumi_scout::registry::HttpRegistryLookup;
use sumi_scout::storage::{resume_from, CsvResultStore};
use sumi_scout::{CrawlController, Runner};
use tracing_subscriber::EnvFilter;

/// Sumi-Scout: a patient contact finder
///
/// Sumi-Scout resolves each organization name in the input to its registered
/// website, then crawls a handful of likely pages for a contact email. Every
/// result is saved as soon as it is known, and an interrupted run resumes
/// where it stopped.
#[derive(Parser, Debug)]
#[command(name = "sumi-scout")]
#[command(version)]
#[command(about = "A patient contact finder", long_about = None)]
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

    /// Validate config and input, and show where a run would resume
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the result file and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_run(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_scout=info,warn"),
            1 => EnvFilter::new("sumi_scout=debug,info"),
            2 => EnvFilter::new("sumi_scout=trace,debug"),
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

/// Handles the --dry-run mode: validates config and input, shows the resume point
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Sumi-Scout Dry Run ===\n");

    let entities = load_entities(Path::new(&config.input.path), &config.input.name_column)
        .with_context(|| format!("failed to read input {}", config.input.path))?;

    let resume_point = resume_from(&read_results(&config.output.results_path)?);

    println!("Input:");
    println!("  File: {}", config.input.path);
    println!("  Column: {}", config.input.name_column);
    println!("  Entities: {}", entities.len());

    println!("\nOutput:");
    println!("  Results: {}", config.output.results_path);
    println!("  Resume point: {}", resume_point);
    println!(
        "  Remaining: {}",
        entities.iter().filter(|e| e.index >= resume_point).count()
    );

    println!("\nRegistry:");
    println!("  Search URL: {}", config.registry.search_url);
    println!("  Website selector: {}", config.registry.website_selector);

    println!("\nCrawler:");
    println!("  Max pages per site: {}", config.crawler.max_pages);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Contact paths: {}", config.crawler.contact_paths.join(", "));

    println!("\nNetwork:");
    println!(
        "  Retries per URL: {} (backoff {}ms to {}ms)",
        config.network.max_connection_retries,
        config.network.retry_delay_ms,
        config.network.max_retry_delay_ms
    );
    println!(
        "  Abort after {} URLs in a row without connectivity",
        config.network.max_consecutive_outages
    );

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the result file
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Results: {}\n", config.output.results_path);

    let stats = read_statistics(&config.output.results_path)
        .with_context(|| format!("failed to read results {}", config.output.results_path))?;
    print_statistics(&stats);

    Ok(())
}

/// Reads the result file without opening it for writing; a missing file is empty
fn read_results(path: &str) -> anyhow::Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e).with_context(|| format!("failed to read results {}", path)),
    }
}

/// Handles the main enrichment run
async fn handle_run(config: Config) -> anyhow::Result<()> {
    let entities = load_entities(Path::new(&config.input.path), &config.input.name_column)
        .with_context(|| format!("failed to read input {}", config.input.path))?;
    tracing::info!("Loaded {} entities from {}", entities.len(), config.input.path);

    let store = CsvResultStore::open(&config.output.results_path)
        .with_context(|| format!("failed to open {}", config.output.results_path))?;

    let probe: Arc<dyn ConnectivityProbe> = Arc::new(TcpProbe::from_config(&config.network)?);
    let client = build_http_client(&config.user_agent, &config.crawler)?;
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(client, probe.clone()));

    let lookup = HttpRegistryLookup::from_config(&config, fetcher.clone(), probe.clone())?;
    let controller = CrawlController::from_config(&config, fetcher, probe);
    let mut runner = Runner::new(Box::new(lookup), controller, store);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let summary = runner.run(&entities, shutdown).await.map_err(|e| {
        tracing::error!("Run aborted: {}", e);
        e
    })?;

    if summary.interrupted {
        tracing::info!("Run interrupted; rerun the same command to resume");
    }
    tracing::info!(
        "Processed {} entities from index {}: {} websites, {} emails (average {:.2}s)",
        summary.processed,
        summary.resumed_from,
        summary.websites_found,
        summary.emails_found,
        summary.average_seconds
    );

    Ok(())
}
