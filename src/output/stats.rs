//! Run statistics
//!
//! Every ad that enters the per-keyword pipeline produces a typed
//! [`AdOutcome`] instead of disappearing into a silent catch-and-continue.
//! Keyword workers aggregate outcomes into [`KeywordStats`], and the
//! scheduler merges those into one [`RunSummary`] printed at the end of
//! the run.

use std::fmt;

/// Outcome of processing one candidate ad
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdOutcome {
    /// Record fully written
    Harvested,

    /// Output directory already existed; no network calls were made
    AlreadyClaimed,

    /// No detail link could be resolved (expected for delisted ads)
    LinkUnresolved,

    /// Write or image failure; the ad was abandoned
    Failed(String),
}

/// Per-keyword aggregation of pipeline outcomes
#[derive(Debug, Clone, Default)]
pub struct KeywordStats {
    /// Result pages fetched for this keyword
    pub pages_fetched: u32,

    /// Eligible listing nodes seen across all pages, before filtering
    pub listings_found: usize,

    pub harvested: usize,
    pub already_claimed: usize,
    pub link_unresolved: usize,
    pub failed: usize,
}

impl KeywordStats {
    /// Records one ad's outcome
    pub fn record(&mut self, outcome: &AdOutcome) {
        match outcome {
            AdOutcome::Harvested => self.harvested += 1,
            AdOutcome::AlreadyClaimed => self.already_claimed += 1,
            AdOutcome::LinkUnresolved => self.link_unresolved += 1,
            AdOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Whole-run aggregation across all keyword workers
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Keywords whose crawl ran to completion
    pub keywords_processed: usize,

    /// Keywords whose crawl aborted on a page-fetch failure
    pub keywords_aborted: usize,

    pub pages_fetched: u32,
    pub listings_found: usize,
    pub harvested: usize,
    pub already_claimed: usize,
    pub link_unresolved: usize,
    pub failed: usize,
}

impl RunSummary {
    /// Merges one keyword's stats into the run totals
    pub fn merge(&mut self, stats: &KeywordStats) {
        self.pages_fetched += stats.pages_fetched;
        self.listings_found += stats.listings_found;
        self.harvested += stats.harvested;
        self.already_claimed += stats.already_claimed;
        self.link_unresolved += stats.link_unresolved;
        self.failed += stats.failed;
    }

    /// Folds another worker's partial summary into this one
    pub fn absorb(&mut self, other: &RunSummary) {
        self.keywords_processed += other.keywords_processed;
        self.keywords_aborted += other.keywords_aborted;
        self.pages_fetched += other.pages_fetched;
        self.listings_found += other.listings_found;
        self.harvested += other.harvested;
        self.already_claimed += other.already_claimed;
        self.link_unresolved += other.link_unresolved;
        self.failed += other.failed;
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Harvest Summary ===")?;
        writeln!(
            f,
            "Keywords: {} processed, {} aborted",
            self.keywords_processed, self.keywords_aborted
        )?;
        writeln!(f, "Pages fetched: {}", self.pages_fetched)?;
        writeln!(f, "Listings found: {}", self.listings_found)?;
        writeln!(f, "Harvested: {}", self.harvested)?;
        writeln!(f, "Already captured: {}", self.already_claimed)?;
        writeln!(f, "Link unresolved: {}", self.link_unresolved)?;
        write!(f, "Failed: {}", self.failed)
    }
}
