//! linkscrape main entry point
//!
//! This is the command-line interface for the linkscrape link harvester.

use anyhow::Context;
use clap::Parser;
use linkscrape::config::{load_config_with_hash, validate, Config};
use linkscrape::output::{load_statistics, print_report, print_statistics};
use linkscrape::storage::open_store;
use linkscrape::Pipeline;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// linkscrape: a concurrent link harvester
///
/// Fetches every configured URL through a bounded worker pool, extracts the
/// hyperlinks of each page and stores them in a SQLite database.
#[derive(Parser, Debug)]
#[command(name = "linkscrape")]
#[command(version)]
#[command(about = "A concurrent link harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults if omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be scraped without scraping
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(cli.config.as_deref())?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_scrape(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkscrape=info,warn"),
            1 => EnvFilter::new("linkscrape=debug,info"),
            2 => EnvFilter::new("linkscrape=trace,debug"),
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

/// Loads the configuration file, or validated defaults when none is given
fn load(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            let config = Config::default();
            validate(&config).context("built-in configuration is invalid")?;
            tracing::info!("No configuration file given, using built-in defaults");
            Ok(config)
        }
    }
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== linkscrape Dry Run ===\n");

    println!("Pipeline Configuration:");
    println!("  Workers: {}", config.pipeline.workers);
    println!("  Deadline: {}s", config.pipeline.timeout_secs);
    println!("  Fetch timeout: {}s", config.pipeline.fetch_timeout_secs);
    println!("  Max body size: {} bytes", config.pipeline.max_body_bytes);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nSeed URLs ({}):", config.seeds.urls.len());
    for url in &config.seeds.urls {
        println!("  - {}", url);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would scrape {} URLs with {} workers",
        config.seeds.urls.len(),
        config.pipeline.workers
    );
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use linkscrape::SqliteLinkStore;

    println!("Database: {}\n", config.output.database_path);

    let store = SqliteLinkStore::open(Path::new(&config.output.database_path))
        .context("failed to open database")?;
    let stats = load_statistics(&store).context("failed to read statistics")?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main scrape operation
///
/// Schema creation failure is the only fatal error; every per-URL failure is
/// reported and the process still exits successfully.
async fn handle_scrape(config: Config) -> anyhow::Result<()> {
    let store = open_store(Path::new(&config.output.database_path))
        .await
        .with_context(|| {
            format!(
                "failed to initialize database {}",
                config.output.database_path
            )
        })?;
    tracing::info!("Database ready: {}", config.output.database_path);

    let pipeline = Pipeline::from_config(&config, store).context("failed to build HTTP client")?;

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling pipeline");
            on_signal.cancel();
        }
    });

    let report = pipeline
        .run_until(config.seeds.urls.clone(), &shutdown)
        .await;

    print_report(&report);
    tracing::info!("Scraping completed in {:.2?}", report.elapsed);

    Ok(())
}
