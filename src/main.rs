//! Inserat-Harvester main entry point
//!
//! Command-line interface for the keyword-driven classified-ad harvester.

use clap::Parser;
use inserat_harvester::config::{load_config, load_keywords};
use inserat_harvester::harvest::harvest;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Inserat-Harvester: a keyword-driven classified-ad harvester
///
/// Searches a marketplace for each keyword, filters listings by price and
/// photo count, and persists every new ad as a directory with its JSON
/// dump and sanitized images. Ads that were already captured are skipped.
#[derive(Parser, Debug)]
#[command(name = "inserat-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A keyword-driven classified-ad harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Path to newline-delimited keyword list
    #[arg(value_name = "KEYWORDS")]
    keywords: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let keywords = load_keywords(&cli.keywords)?;
    if keywords.is_empty() {
        tracing::warn!("Keyword list {} is empty", cli.keywords.display());
        return Ok(());
    }

    if cli.dry_run {
        handle_dry_run(&config, &keywords);
        return Ok(());
    }

    tracing::info!(
        "Harvesting {} keywords with {} workers",
        keywords.len(),
        config.harvester.max_threads
    );

    let summary = harvest(config, keywords).await?;
    println!("{}", summary);

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("inserat_harvester=info,warn"),
            1 => EnvFilter::new("inserat_harvester=debug,info"),
            2 => EnvFilter::new("inserat_harvester=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the run setup
fn handle_dry_run(config: &inserat_harvester::Config, keywords: &[String]) {
    println!("=== Inserat-Harvester Dry Run ===\n");

    println!("Harvester:");
    println!("  Workers: {}", config.harvester.max_threads);
    println!("  Randomized keywords: {}", config.harvester.random_keywords);
    println!("  Max pages per keyword: {}", config.harvester.max_pages);

    println!("\nFilters:");
    println!(
        "  Price range: {} - {}",
        config.filters.min_price, config.filters.max_price
    );
    println!("  Minimum pictures: {}", config.filters.min_pictures);
    println!("  Price reduction: {}", config.filters.price_reduction);

    println!("\nOutput:");
    println!("  Root: {}", config.output.root_path);
    println!("  Forward-ready export: {}", config.output.forward_ready);

    println!("\nSite:");
    println!("  Base URL: {}", config.site.base_url);

    println!("\nKeywords ({}):", keywords.len());
    for keyword in keywords {
        println!("  - {}", keyword);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would harvest {} keywords", keywords.len());
}
