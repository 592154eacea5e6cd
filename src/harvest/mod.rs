//! The harvesting pipeline
//!
//! This module contains the core harvesting logic:
//! - HTTP fetching for pages and images
//! - Listing extraction and business filtering
//! - Detail-page enrichment (canonical link, description)
//! - Image sanitization
//! - Per-keyword pagination and keyword scheduling

mod crawler;
mod detail;
mod extractor;
mod fetcher;
mod images;
mod scheduler;

pub use crawler::{KeywordCrawler, KeywordRun};
pub use detail::{fetch_description, resolve_link, DESCRIPTION_SENTINEL};
pub use extractor::{ExtractedPage, ListingExtractor};
pub use fetcher::{build_http_client, fetch_bytes, fetch_page};
pub use images::{sanitize, sanitize_bytes};
pub use scheduler::{run_harvest, KeywordPool};

use crate::config::Config;
use crate::output::RunSummary;
use crate::Result;

/// Runs a complete harvest over the given keywords
///
/// Builds the shared HTTP client and the per-keyword pipeline, then
/// drains the keyword pool with the configured worker-pool size.
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `keywords` - Keywords to search, each processed exactly once
///
/// # Returns
///
/// * `Ok(RunSummary)` - Aggregated outcome counts for the whole run
/// * `Err(HarvestError)` - Failed to initialize the pipeline
pub async fn harvest(config: Config, keywords: Vec<String>) -> Result<RunSummary> {
    let client = build_http_client()?;
    let crawler = KeywordCrawler::new(&config, client)?;

    Ok(run_harvest(
        crawler,
        keywords,
        config.harvester.max_threads,
        config.harvester.random_keywords,
    )
    .await)
}
