//! Image download and sanitization
//!
//! Listing photos are fetched as raw bytes, decoded, and re-encoded from a
//! fresh pixel buffer so that nothing but pixel data survives: location
//! tags, camera data, embedded thumbnails, and comments are all dropped.
//! The final encode converts to lossy RGB JPEG.
//!
//! A decode failure is fatal for the single ad whose record is being
//! materialized; the caller abandons that record and moves on.

use crate::{HarvestError, Result};
use image::ImageOutputFormat;
use reqwest::Client;
use std::io::Cursor;

use crate::harvest::fetcher::fetch_bytes;

/// JPEG quality used for the final encode
const JPEG_QUALITY: u8 = 90;

/// Fetches an image and returns its sanitized bytes
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The source image URL
///
/// # Returns
///
/// * `Ok(bytes)` - JPEG bytes containing only pixel data
/// * `Err(HarvestError)` - Fetch or decode failed
pub async fn sanitize(client: &Client, url: &str) -> Result<Vec<u8>> {
    let raw = fetch_bytes(client, url).await?;
    sanitize_bytes(&raw)
}

/// Re-encodes image bytes through a fresh pixel buffer
///
/// Decodes the input, copies only the pixel data into a new buffer of
/// identical dimensions, and encodes that buffer as RGB JPEG. Any
/// metadata embedded in the source stream is discarded because it is
/// never carried into the new buffer.
pub fn sanitize_bytes(raw: &[u8]) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(raw).map_err(HarvestError::Image)?;

    // Pixel data only; the decoded image's metadata stays behind
    let pixels = decoded.to_rgb8();

    let mut out = Cursor::new(Vec::new());
    pixels
        .write_to(&mut out, ImageOutputFormat::Jpeg(JPEG_QUALITY))
        .map_err(HarvestError::Image)?;

    Ok(out.into_inner())
}
