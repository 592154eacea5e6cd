//! Listing extraction from search-results pages
//!
//! This module parses one results page into candidate ads and applies the
//! business filters:
//! - Sponsored/marketplace-partner placements are excluded entirely
//! - Nodes without an `item-<id>` id attribute are skipped silently
//! - Titles lose any leading watcher-count noise
//! - The advertised price must match the currency pattern and fall inside
//!   the configured range before the reduction factor is applied
//! - Listings with fewer photos than the configured minimum are dropped
//!
//! A malformed node never aborts the rest of its page.

use crate::config::FilterConfig;
use crate::model::CandidateAd;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// CSS class marker identifying sponsored partner placements
const PARTNER_CLASS_MARKER: &str = "amazon";

/// Localized watcher-count token that pollutes listing titles
const WATCHER_MARKER: &str = "Beobachter";

/// Prefix of the DOM id attribute carrying the ad identifier
const ITEM_ID_PREFIX: &str = "item-";

/// Result of extracting one search-results page
///
/// `nodes_seen` counts the non-sponsored listing nodes on the page before
/// any per-item filter runs. Pagination keys off this count: a page whose
/// listings were merely filtered out still means there are more results.
#[derive(Debug)]
pub struct ExtractedPage {
    /// Eligible listing nodes on the page, pre-filter
    pub nodes_seen: usize,

    /// Candidates that passed all business filters, in page order
    pub candidates: Vec<CandidateAd>,
}

/// Extracts candidate ads from search-results pages
pub struct ListingExtractor {
    filters: FilterConfig,
    price_re: Regex,
}

impl ListingExtractor {
    /// Creates an extractor with the given business filters
    pub fn new(filters: FilterConfig) -> Result<Self, regex::Error> {
        // Currency-prefixed decimal, comma as decimal separator
        let price_re = Regex::new(r"EUR\s*([\d,]+(?:\.\d{2})?)")?;
        Ok(Self { filters, price_re })
    }

    /// Parses one results page into its eligible nodes and candidates
    ///
    /// # Arguments
    ///
    /// * `html` - The raw HTML of a search-results page
    ///
    /// # Returns
    ///
    /// The pre-filter node count plus the surviving candidates. A page
    /// with `nodes_seen == 0` is exhausted and ends pagination; a page
    /// whose nodes were all filtered out does not.
    pub fn extract(&self, html: &str) -> ExtractedPage {
        let document = Html::parse_document(html);
        let mut page = ExtractedPage {
            nodes_seen: 0,
            candidates: Vec::new(),
        };

        let item_selector = match Selector::parse(".items.list-unstyled li") {
            Ok(s) => s,
            Err(_) => return page,
        };

        for node in document.select(&item_selector) {
            if is_partner_listing(&node) {
                continue;
            }
            page.nodes_seen += 1;

            match self.extract_node(&node) {
                Some(candidate) => page.candidates.push(candidate),
                None => continue,
            }
        }

        page
    }

    /// Extracts a single listing node, applying all per-node filters
    ///
    /// Returns None when the node is malformed or filtered out; the reason
    /// is logged at debug level so one bad node never stops the page.
    fn extract_node(&self, node: &ElementRef) -> Option<CandidateAd> {
        // Ad identifier comes from the id attribute pattern "item-<id>"
        let id = node
            .value()
            .attr("id")
            .and_then(|attr| attr.strip_prefix(ITEM_ID_PREFIX))
            .filter(|id| !id.is_empty())?
            .to_string();

        let anchor_selector = Selector::parse("a").ok()?;
        let title_raw = node
            .select(&anchor_selector)
            .next()
            .map(|a| a.text().collect::<String>().trim().to_string())?;
        let title = strip_watcher_prefix(&title_raw);

        let price_selector = Selector::parse(".price").ok()?;
        let price_text = node
            .select(&price_selector)
            .next()
            .map(|p| p.text().collect::<String>())?;

        let raw_price = match self.parse_price(&price_text) {
            Some(price) => price,
            None => {
                tracing::debug!("Skipping '{}': unparseable price '{}'", title, price_text.trim());
                return None;
            }
        };

        // Range check applies to the advertised price, before reduction
        if raw_price < self.filters.min_price || raw_price > self.filters.max_price {
            tracing::debug!("Skipping '{}': price {} outside range", title, raw_price);
            return None;
        }

        let img_selector = Selector::parse("img").ok()?;
        let image_urls: Vec<String> = node
            .select(&img_selector)
            .filter_map(|img| img.value().attr("src"))
            .filter(|src| !src.is_empty())
            .map(str::to_string)
            .collect();

        if image_urls.is_empty() {
            tracing::debug!("Skipping '{}': no image URL", title);
            return None;
        }

        if image_urls.len() < self.filters.min_pictures {
            tracing::debug!(
                "Skipping '{}': {} pictures < minimum {}",
                title,
                image_urls.len(),
                self.filters.min_pictures
            );
            return None;
        }

        let price = (raw_price * self.filters.price_reduction).round() as u32;

        Some(CandidateAd {
            id,
            title,
            price,
            image_urls,
        })
    }

    /// Parses the advertised price out of a `.price` node's text
    ///
    /// The site writes prices like `EUR 120,00` with a comma as the
    /// decimal separator; the comma is normalized to a dot before parsing.
    fn parse_price(&self, text: &str) -> Option<f64> {
        let captures = self.price_re.captures(text)?;
        let normalized = captures.get(1)?.as_str().replace(',', ".");
        normalized.parse::<f64>().ok()
    }
}

/// Whether a listing node is a sponsored marketplace-partner placement
fn is_partner_listing(node: &ElementRef) -> bool {
    node.value()
        .attr("class")
        .map(|class| class.contains(PARTNER_CLASS_MARKER))
        .unwrap_or(false)
}

/// Strips watcher-count noise from a listing title
///
/// Titles sometimes arrive as `"12 Beobachter Vintage Guitar"`; everything
/// up to and including the last marker occurrence is dropped.
fn strip_watcher_prefix(title: &str) -> String {
    match title.rfind(WATCHER_MARKER) {
        Some(pos) => title[pos + WATCHER_MARKER.len()..].trim().to_string(),
        None => title.to_string(),
    }
}
