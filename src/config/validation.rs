use crate::config::types::{Config, FilterConfig, HarvesterConfig, OutputConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_harvester_config(&config.harvester)?;
    validate_filter_config(&config.filters)?;
    validate_output_config(&config.output)?;
    validate_site_config(&config.site)?;
    Ok(())
}

/// Validates worker-pool configuration
fn validate_harvester_config(config: &HarvesterConfig) -> Result<(), ConfigError> {
    if config.max_threads < 1 || config.max_threads > 64 {
        return Err(ConfigError::Validation(format!(
            "max-threads must be between 1 and 64, got {}",
            config.max_threads
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    Ok(())
}

/// Validates business-filter configuration
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    if config.min_price < 0.0 {
        return Err(ConfigError::Validation(format!(
            "min-price must be >= 0, got {}",
            config.min_price
        )));
    }

    if config.max_price < config.min_price {
        return Err(ConfigError::Validation(format!(
            "max-price ({}) must be >= min-price ({})",
            config.max_price, config.min_price
        )));
    }

    if config.min_pictures < 1 {
        return Err(ConfigError::Validation(format!(
            "min-pictures must be >= 1, got {}",
            config.min_pictures
        )));
    }

    if config.price_reduction <= 0.0 || config.price_reduction > 1.0 {
        return Err(ConfigError::Validation(format!(
            "price-reduction must be in (0, 1], got {}",
            config.price_reduction
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root_path.is_empty() {
        return Err(ConfigError::Validation(
            "root-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the marketplace endpoint
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must be http(s), got scheme '{}'",
            url.scheme()
        )));
    }

    Ok(())
}
