//! Detail-page enrichment
//!
//! Once a candidate ad has claimed its output directory, this module
//! resolves its canonical listing URL and scrapes the free-text
//! description from the detail page.
//!
//! Both operations degrade rather than propagate: an unresolvable link is
//! expected for delisted ads and comes back as `None`, and a missing
//! description falls back to a sentinel string. Network and parse failures
//! are logged and treated the same way.

use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::harvest::fetcher::fetch_page;

/// Placeholder stored when no description text can be found
pub const DESCRIPTION_SENTINEL: &str = "no description available";

/// Description selectors, tried in order; first non-empty text wins
const DESCRIPTION_SELECTORS: &[&str] = &[
    ".summary.description span",
    ".description",
    "#description",
    ".item-description",
    "[data-testid='description']",
];

/// Minimum length for the generic fallback to accept a text block
const MIN_DESCRIPTION_LEN: usize = 50;

/// Resolves an ad's canonical listing URL from its identifier
///
/// Searches the marketplace for the exact id and looks for an
/// id-addressed anchor first, then any result anchor whose href contains
/// the id. Relative hrefs are resolved against the site root.
///
/// # Returns
///
/// * `Some(url)` - The absolute detail-page URL
/// * `None` - No match (expected for delisted/expired ads) or fetch failed
pub async fn resolve_link(client: &Client, base: &Url, id: &str) -> Option<String> {
    let mut search_url = base.clone();
    search_url.query_pairs_mut().append_pair("q", id);

    let html = match fetch_page(client, search_url.as_str()).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("Link resolution fetch failed for {}: {}", id, e);
            return None;
        }
    };

    find_listing_href(&html, base, id)
}

/// Scans a search-results page for the detail link of one specific ad
fn find_listing_href(html: &str, base: &Url, id: &str) -> Option<String> {
    let document = Html::parse_document(html);

    // The item's own node carries the link directly
    if let Ok(item_selector) = Selector::parse(&format!("#item-{} a", id)) {
        if let Some(anchor) = document.select(&item_selector).next() {
            if let Some(href) = anchor.value().attr("href") {
                return resolve_href(base, href);
            }
        }
    }

    // Fallback: any result anchor whose href mentions the id
    if let Ok(anchor_selector) = Selector::parse(".items.list-unstyled li a") {
        for anchor in document.select(&anchor_selector) {
            if let Some(href) = anchor.value().attr("href") {
                if href.contains(id) {
                    return resolve_href(base, href);
                }
            }
        }
    }

    None
}

/// Resolves a possibly-relative href against the site root
fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    base.join(href).ok().map(|url| url.to_string())
}

/// Fetches an ad's free-text description from its detail page
///
/// Tries the specific description selectors in order, then falls back to
/// the first paragraph or division with a substantial block of text.
/// Returns the sentinel when nothing matches or the fetch fails.
pub async fn fetch_description(client: &Client, link: &str) -> String {
    let html = match fetch_page(client, link).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("Description fetch failed for {}: {}", link, e);
            return DESCRIPTION_SENTINEL.to_string();
        }
    };

    extract_description(&html).unwrap_or_else(|| DESCRIPTION_SENTINEL.to_string())
}

/// Applies the ordered selector strategies to a detail page
fn extract_description(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for selector_str in DESCRIPTION_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                let text = element.text().collect::<String>().trim().to_string();
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }

    // Generic fallback: first substantial text block
    if let Ok(selector) = Selector::parse("p, div") {
        for element in document.select(&selector) {
            let text = element.text().collect::<String>().trim().to_string();
            if text.len() > MIN_DESCRIPTION_LEN {
                return Some(text);
            }
        }
    }

    None
}
