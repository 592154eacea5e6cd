//! Ad data model
//!
//! A [`CandidateAd`] is what the listing extractor emits for each node on a
//! results page that survives the business filters. Once the dedup gate
//! passes it is enriched with its canonical link and description, becoming
//! an [`EnrichedAd`] — the shape that is persisted to disk.

use serde::Serialize;

/// A listing extracted from a results page, before enrichment and dedup
///
/// `price` is the post-reduction value, rounded to the nearest whole
/// currency unit; the configured price range was checked against the
/// advertised (pre-reduction) value before this struct was built.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateAd {
    /// Site-assigned identifier, unique per ad
    pub id: String,

    /// Listing title, with any watcher-count prefix stripped
    pub title: String,

    /// Reduced price in whole currency units
    pub price: u32,

    /// Source image URLs, primary thumbnail first
    pub image_urls: Vec<String>,
}

/// A candidate ad augmented with its canonical link and description
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedAd {
    pub id: String,
    pub title: String,
    pub price: u32,
    pub image_urls: Vec<String>,

    /// Canonical detail-page URL, absolute
    pub listing_link: String,

    /// Free-text description, or the sentinel when none was found
    pub description: String,
}

impl EnrichedAd {
    /// Combines a candidate with its resolved link and description
    pub fn new(candidate: CandidateAd, listing_link: String, description: String) -> Self {
        Self {
            id: candidate.id,
            title: candidate.title,
            price: candidate.price,
            image_urls: candidate.image_urls,
            listing_link,
            description,
        }
    }
}
