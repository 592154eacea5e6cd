//! HTTP fetcher
//!
//! This module handles all HTTP requests for the harvester:
//! - Building the shared HTTP client with a proper user agent string
//! - GET requests for search-results and detail pages
//! - GET requests for raw image bytes
//!
//! Requests carry explicit deadlines so a stalled response never blocks a
//! keyword worker indefinitely. There is no retry logic anywhere: a failed
//! fetch is reported to the caller, which either stops pagination for the
//! keyword or abandons the single ad.

use crate::HarvestError;
use reqwest::Client;
use std::time::Duration;

/// Builds the HTTP client shared by all keyword workers
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page and returns its body as text
///
/// Any non-success status is an error; the caller decides whether that
/// ends a keyword's pagination or just one ad's enrichment.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, HarvestError> {
    let response = client.get(url).send().await?;
    let status = response.status();

    if !status.is_success() {
        return Err(HarvestError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response.text().await?)
}

/// Fetches raw bytes, used for image downloads
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>, HarvestError> {
    let response = client.get(url).send().await?;
    let status = response.status();

    if !status.is_success() {
        return Err(HarvestError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response.bytes().await?.to_vec())
}
