//! Configuration module for the harvester
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, plus loading the newline-delimited keyword list.
//!
//! # Example
//!
//! ```no_run
//! use inserat_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Worker pool size: {}", config.harvester.max_threads);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FilterConfig, HarvesterConfig, OutputConfig, SiteConfig};

// Re-export parser functions
pub use parser::{load_config, load_keywords};
