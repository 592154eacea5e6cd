//! Inserat-Harvester: a keyword-driven classified-ad harvester
//!
//! This crate crawls a marketplace's search results for a set of keywords,
//! filters the listings it finds by price range and photo count, enriches
//! each surviving ad with its canonical link and description, sanitizes its
//! images, and persists the result as a self-contained directory on disk.
//! An ad whose output directory already exists is never processed twice.

pub mod config;
pub mod harvest;
pub mod model;
pub mod output;
pub mod store;

use thiserror::Error;

/// Main error type for harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Request failed with status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Record serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record store error for {path}: {source}")]
    Store {
        path: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{CandidateAd, EnrichedAd};
pub use output::RunSummary;
