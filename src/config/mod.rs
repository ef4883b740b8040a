//! Storefront configuration

use clap::Args;

pub mod catalog;
pub mod checkout;
pub mod database;
pub mod logging;

pub use catalog::CatalogConfig;
pub use checkout::CheckoutConfig;
pub use database::DatabaseConfig;
pub use logging::{LogFormat, LoggingConfig};

/// Storefront configuration, read from CLI arguments and the environment.
#[derive(Debug, Clone, Args)]
pub struct StorefrontConfig {
    /// Remote catalog settings.
    #[command(flatten)]
    pub catalog: CatalogConfig,

    /// Local mirror database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Checkout settings.
    #[command(flatten)]
    pub checkout: CheckoutConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

/// Load `.env` into the process environment if present.
pub fn load_dotenv() {
    // A missing file is fine.
    _ = dotenvy::dotenv();
}
