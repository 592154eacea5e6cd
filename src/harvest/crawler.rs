//! Per-keyword crawl pipeline
//!
//! One keyword's crawl walks the paginated search results up to the
//! configured page cap, feeds every page through the listing extractor,
//! and runs each surviving candidate through the enrichment pipeline:
//! dedup check, detail-link resolution, description scrape, claim,
//! image sanitization, and record materialization — strictly sequentially.
//!
//! Failure handling follows the taxonomy in the crate docs: a hard page
//! fetch failure aborts the keyword (an inaccessible page usually means
//! exhaustion or site-side blocking, so there are no retries), an empty
//! page ends pagination normally, and every per-ad failure is absorbed
//! into that ad's outcome.

use reqwest::Client;
use url::Url;

use crate::config::Config;
use crate::harvest::detail::{fetch_description, resolve_link};
use crate::harvest::extractor::ListingExtractor;
use crate::harvest::fetcher::fetch_page;
use crate::harvest::images;
use crate::model::{CandidateAd, EnrichedAd};
use crate::output::{AdOutcome, KeywordStats};
use crate::store::{Claim, RecordStore};
use crate::Result;

/// Result of one keyword's crawl
#[derive(Debug)]
pub struct KeywordRun {
    pub stats: KeywordStats,

    /// True when the crawl stopped on a page-fetch failure rather than
    /// running to exhaustion
    pub aborted: bool,
}

/// Drives the extraction and enrichment pipeline for single keywords
pub struct KeywordCrawler {
    client: Client,
    base_url: Url,
    extractor: ListingExtractor,
    store: RecordStore,
    max_pages: u32,
}

impl KeywordCrawler {
    /// Builds a crawler from the run configuration and a shared client
    pub fn new(config: &Config, client: Client) -> Result<Self> {
        let base_url = Url::parse(&config.site.base_url)?;
        let extractor = ListingExtractor::new(config.filters.clone())?;
        let store = RecordStore::new(&config.output.root_path, config.output.forward_ready)?;

        Ok(Self {
            client,
            base_url,
            extractor,
            store,
            max_pages: config.harvester.max_pages,
        })
    }

    /// Crawls one keyword's result pages until exhaustion or the page cap
    pub async fn crawl_keyword(&self, keyword: &str) -> KeywordRun {
        let mut stats = KeywordStats::default();

        for page in 1..=self.max_pages {
            let url = self.search_url(keyword, page);
            tracing::debug!("Searching page {}: {}", page, url);

            let html = match fetch_page(&self.client, url.as_str()).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::warn!("Page fetch failed for '{}' page {}: {}", keyword, page, e);
                    return KeywordRun {
                        stats,
                        aborted: true,
                    };
                }
            };
            stats.pages_fetched += 1;

            let extracted = self.extractor.extract(&html);

            // Exhaustion means no listing nodes at all; a page whose
            // nodes were all filtered out still has more pages behind it
            if extracted.nodes_seen == 0 {
                tracing::info!("No listings for '{}' on page {}", keyword, page);
                break;
            }

            tracing::info!(
                "Found {} listings for '{}' on page {} ({} passed filters)",
                extracted.nodes_seen,
                keyword,
                page,
                extracted.candidates.len()
            );
            stats.listings_found += extracted.nodes_seen;

            for candidate in &extracted.candidates {
                let outcome = self.process_candidate(candidate).await;
                match &outcome {
                    AdOutcome::Harvested => {
                        tracing::info!("Harvested '{}'", candidate.title);
                    }
                    AdOutcome::AlreadyClaimed => {
                        tracing::debug!("Already captured '{}'", candidate.title);
                    }
                    AdOutcome::LinkUnresolved => {
                        tracing::info!("Could not resolve link for '{}'", candidate.title);
                    }
                    AdOutcome::Failed(reason) => {
                        tracing::warn!("Failed to write '{}': {}", candidate.title, reason);
                    }
                }
                stats.record(&outcome);
            }
        }

        KeywordRun {
            stats,
            aborted: false,
        }
    }

    /// Runs one candidate through dedup, enrichment, and materialization
    ///
    /// The dedup check comes first: an already-claimed ad costs zero
    /// further network calls.
    async fn process_candidate(&self, candidate: &CandidateAd) -> AdOutcome {
        if self.store.is_claimed(candidate) {
            return AdOutcome::AlreadyClaimed;
        }

        // Absent link is expected for delisted ads: skip, no record
        let listing_link = match resolve_link(&self.client, &self.base_url, &candidate.id).await {
            Some(link) => link,
            None => return AdOutcome::LinkUnresolved,
        };

        let description = fetch_description(&self.client, &listing_link).await;
        let ad = EnrichedAd::new(candidate.clone(), listing_link, description);

        let claim = match self.store.try_claim(&ad) {
            Ok(Some(claim)) => claim,
            Ok(None) => return AdOutcome::AlreadyClaimed,
            Err(e) => return AdOutcome::Failed(e.to_string()),
        };

        match self.materialize(&claim, &ad).await {
            Ok(()) => match claim.commit() {
                Ok(()) => AdOutcome::Harvested,
                Err(e) => AdOutcome::Failed(e.to_string()),
            },
            Err(e) => {
                claim.abandon();
                AdOutcome::Failed(e.to_string())
            }
        }
    }

    /// Writes the record dump and all sanitized images into staging
    async fn materialize(&self, claim: &Claim, ad: &EnrichedAd) -> Result<()> {
        claim.write_record(ad, self.store.forward_ready())?;

        for (index, image_url) in ad.image_urls.iter().enumerate() {
            let absolute = self.base_url.join(image_url)?;
            let bytes = images::sanitize(&self.client, absolute.as_str()).await?;
            claim.write_image(index, &bytes)?;
        }

        Ok(())
    }

    /// Builds the search-results URL for a keyword and page number
    fn search_url(&self, keyword: &str, page: u32) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("q", keyword)
            .append_pair("page", &page.to_string());
        url
    }
}
