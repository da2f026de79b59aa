//! Kumo-Press main entry point
//!
//! Command-line interface for the Kumo-Press article harvester.

use anyhow::Result;
use clap::Parser;
use kumo_press::config::load_config_with_hash;
use kumo_press::harvester::Harvester;
use kumo_press::storage::{SqliteStorage, Storage};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Kumo-Press: a polite news article harvester
///
/// Walks a paginated search listing, fetches articles it has not seen
/// before through a two-tier cache, and persists extracted records with
/// update-in-place semantics.
#[derive(Parser, Debug)]
#[command(name = "kumo-press")]
#[command(version = "1.0.0")]
#[command(about = "A polite news article harvester", long_about = None)]
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

    /// Reset visited URLs before harvesting (re-harvests everything)
    #[arg(long)]
    reset: bool,

    /// Clear the entire durable response cache and exit
    #[arg(long, conflicts_with_all = ["stats", "dry_run", "reset"])]
    clear_cache: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["clear_cache", "dry_run", "reset"])]
    stats: bool,

    /// Validate config and show what would be harvested without fetching
    #[arg(long, conflicts_with_all = ["clear_cache", "stats", "reset"])]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
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
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.clear_cache {
        handle_clear_cache(config)?;
    } else {
        handle_harvest(config, cli.reset).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kumo_press=info,warn"),
            1 => EnvFilter::new("kumo_press=debug,info"),
            2 => EnvFilter::new("kumo_press=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the planned pass
fn handle_dry_run(config: &kumo_press::config::Config) -> Result<()> {
    println!("=== Kumo-Press Dry Run ===\n");

    println!("Harvest:");
    println!("  Pages per pass: {}", config.harvest.pages);
    println!(
        "  Max articles per page: {}",
        config.harvest.max_articles_per_page
    );
    println!("  Source label: {}", config.harvest.source_label);
    println!("  Term variants: {:?}", config.harvest.term_variants);
    println!("  Short term: {}", config.harvest.short_term);
    println!("  Long term: {}", config.harvest.long_term);

    println!("\nSearch:");
    println!("  Base URL: {}", config.search.base_url);

    println!("\nCache:");
    println!("  Directory: {}", config.cache.directory);
    println!("  Read TTL: {}h", config.cache.ttl_hours);
    println!("  Eviction window: {}h", config.cache.eviction_hours);
    println!("  File retention: {}d", config.cache.file_retention_days);

    println!("\nFetch:");
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Retries: {}", config.fetch.retry_count);
    println!(
        "  Request delay: {}-{}ms",
        config.fetch.request_delay_min_ms, config.fetch.request_delay_max_ms
    );
    println!(
        "  Page delay: {}-{}ms",
        config.fetch.page_delay_min_ms, config.fetch.page_delay_max_ms
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &kumo_press::config::Config) -> Result<()> {
    use std::path::Path;

    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

    println!("Total articles: {}", storage.count_records()?);

    let by_source = storage.counts_by_source()?;
    if !by_source.is_empty() {
        println!("By source:");
        let mut sources: Vec<_> = by_source.into_iter().collect();
        sources.sort();
        for (source, count) in sources {
            println!("  {}: {}", source, count);
        }
    }

    match storage.latest_fetch()? {
        Some(latest) => println!("Latest update: {}", latest),
        None => println!("Latest update: never"),
    }

    Ok(())
}

/// Handles the --clear-cache mode: truncates the durable response cache
fn handle_clear_cache(config: kumo_press::config::Config) -> Result<()> {
    let harvester = Harvester::new(config)?;
    let cleared = harvester.clear_all_cache()?;
    println!("Cleared {} cache entries", cleared);
    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: kumo_press::config::Config, reset: bool) -> Result<()> {
    let mut harvester = Harvester::new(config)?;

    // Routine grooming before the pass, each tier on its own window
    harvester.clear_old_cache()?;

    if reset {
        harvester.reset()?;
        tracing::info!("Reset visited URLs - will re-harvest all articles");
    }

    tracing::info!(
        "Starting with {} visited URLs in database",
        harvester.visited_len()
    );

    match harvester.run_all().await {
        Ok(total) => {
            tracing::info!("Harvested a total of {} articles", total);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
