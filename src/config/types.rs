use serde::Deserialize;

/// Main configuration structure for the harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub harvester: HarvesterConfig,
    pub filters: FilterConfig,
    pub output: OutputConfig,
    pub site: SiteConfig,
}

/// Worker-pool and pagination behavior
#[derive(Debug, Clone, Deserialize)]
pub struct HarvesterConfig {
    /// Number of concurrent keyword workers
    #[serde(rename = "max-threads")]
    pub max_threads: u32,

    /// Draw keywords in uniformly random order (without replacement)
    #[serde(rename = "random-keywords", default)]
    pub random_keywords: bool,

    /// Hard cap on result pages fetched per keyword
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_max_pages() -> u32 {
    5
}

/// Business filters applied to every extracted listing
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Minimum advertised price (pre-reduction), in whole currency units
    #[serde(rename = "min-price")]
    pub min_price: f64,

    /// Maximum advertised price (pre-reduction), in whole currency units
    #[serde(rename = "max-price")]
    pub max_price: f64,

    /// Minimum number of listing photos
    #[serde(rename = "min-pictures")]
    pub min_pictures: usize,

    /// Multiplicative factor applied to the advertised price
    #[serde(rename = "price-reduction")]
    pub price_reduction: f64,
}

/// Output layout configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory that holds one subdirectory per harvested ad
    #[serde(rename = "root-path", default = "default_root_path")]
    pub root_path: String,

    /// Also write a flat-text digest file suitable for forwarding
    #[serde(rename = "forward-ready", default)]
    pub forward_ready: bool,
}

fn default_root_path() -> String {
    "inserate".to_string()
}

/// Marketplace endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Site root; search pages and relative detail links resolve against it
    #[serde(rename = "base-url")]
    pub base_url: String,
}
