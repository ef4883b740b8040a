//! Catalog Config

use std::time::Duration;

use clap::Args;

/// Remote catalog settings.
#[derive(Debug, Clone, Args)]
pub struct CatalogConfig {
    /// Base URL of the product catalog API
    #[arg(long, env = "STOREFRONT_API_BASE_URL", default_value = "https://dummyjson.com")]
    pub api_base_url: String,

    /// Products fetched per page
    #[arg(
        long,
        env = "STOREFRONT_PAGE_SIZE",
        default_value_t = 30_u32,
        value_parser = clap::value_parser!(u32).range(1..=100)
    )]
    pub page_size: u32,

    /// Request timeout in seconds
    #[arg(long, env = "STOREFRONT_REQUEST_TIMEOUT_SECONDS", default_value_t = 10_u64)]
    pub request_timeout_seconds: u64,
}

impl CatalogConfig {
    /// Request timeout as a duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
