//! Database Config

use clap::Args;

/// Database settings.
#[derive(Debug, Clone, Args)]
pub struct DatabaseConfig {
    /// `SQLite` connection string for the cart and favorites mirror
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://storefront.db")]
    pub database_url: String,
}
