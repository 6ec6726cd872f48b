//! yc-founders main entry point
//!
//! This is the command-line interface for the YC founder roster collector.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use yc_founders::collector::run_collection;
use yc_founders::config::{read_config_with_hash, validate, Config};
use yc_founders::output::{print_report, resolve_output_path};
use yc_founders::ScrapeError;

/// Exit code for a run stopped by Ctrl-C
const EXIT_INTERRUPTED: u8 = 130;

/// yc-founders: collect founder rosters for YC companies
///
/// Fetches the public company listing, scrapes each company's page for its
/// founders and writes one CSV row per founder. Requests are rate limited
/// and transient failures are retried with backoff.
#[derive(Parser, Debug)]
#[command(name = "yc-founders")]
#[command(version)]
#[command(about = "Collect YC company founder rosters into a CSV file", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (all keys optional)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of companies to collect
    #[arg(short, long)]
    limit: Option<usize>,

    /// Output CSV path (default: output/yc_startups_TIMESTAMP.csv)
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Maximum concurrent detail fetches
    #[arg(long)]
    concurrency: Option<usize>,

    /// Maximum requests per second
    #[arg(long)]
    rps: Option<f64>,

    /// Total attempts per request, including the first
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be collected without any network access
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match prepare_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return ExitCode::SUCCESS;
    }

    match handle_run(config, cli.quiet).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(ScrapeError::Interrupted) => {
            tracing::warn!("Run interrupted; no output file was written");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("yc_founders=info,warn"),
            1 => EnvFilter::new("yc_founders=debug,info"),
            2 => EnvFilter::new("yc_founders=trace,debug"),
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

/// Loads the config file (if any), applies flag overrides and validates
fn prepare_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = read_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, cli);
    validate(&config).context("Invalid configuration")?;

    Ok(config)
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(limit) = cli.limit {
        config.scraper.limit = limit;
    }
    if let Some(concurrency) = cli.concurrency {
        config.scraper.concurrency = concurrency;
    }
    if let Some(rps) = cli.rps {
        config.scraper.requests_per_second = rps;
    }
    if let Some(max_attempts) = cli.max_attempts {
        config.scraper.max_attempts = max_attempts;
    }
    if let Some(output) = &cli.output {
        config.output.path = Some(output.clone());
    }
}

/// Handles the --dry-run mode: shows what would be collected
fn handle_dry_run(config: &Config) {
    println!("=== yc-founders Dry Run ===\n");

    println!("Collection:");
    println!("  Companies: {}", config.scraper.limit);
    println!("  Concurrency: {}", config.scraper.concurrency);
    println!("  Requests per second: {}", config.scraper.requests_per_second);
    println!(
        "  Attempts per request: {} (backoff {}ms..{}ms, jitter {})",
        config.scraper.max_attempts,
        config.scraper.base_delay_ms,
        config.scraper.max_delay_ms,
        if config.scraper.jitter { "on" } else { "off" }
    );
    println!(
        "  Timeouts: {}s request, {}s connect",
        config.scraper.request_timeout_secs, config.scraper.connect_timeout_secs
    );

    println!("\nSource:");
    println!("  Listing: {}", config.source.list_url);
    println!("  Detail pages: {}/companies/<slug>", config.source.base_url);
    println!(
        "  Profile domains: {}",
        config.source.profile_domains.join(", ")
    );
    println!(
        "  Profile paths: {}",
        config.source.profile_path_prefixes.join(", ")
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    let path = resolve_output_path(config.output.path.as_deref(), chrono::Local::now());
    println!("  CSV: {}", path.display());

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would fetch the listing and up to {} detail pages",
        config.scraper.limit
    );
}

/// Handles the main collection run
///
/// Ctrl-C drops the run: in-flight workers are aborted and the temporary
/// output file is removed before anything reaches the final path.
async fn handle_run(config: Config, quiet: bool) -> Result<(), ScrapeError> {
    tracing::info!(
        "Collecting {} companies ({} workers, {} req/s)",
        config.scraper.limit,
        config.scraper.concurrency,
        config.scraper.requests_per_second
    );

    let report = tokio::select! {
        result = run_collection(config) => result?,
        Ok(()) = tokio::signal::ctrl_c() => return Err(ScrapeError::Interrupted),
    };

    if !quiet {
        print_report(&report);
    }

    Ok(())
}
