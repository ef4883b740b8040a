//! Checkout Config

use clap::Args;
use rusty_money::iso::{self, Currency};
use thiserror::Error;

/// The configured currency code is not an ISO 4217 currency.
#[derive(Debug, Error)]
#[error("unknown currency code {0:?}")]
pub struct UnknownCurrency(pub String);

/// Checkout settings.
#[derive(Debug, Clone, Args)]
pub struct CheckoutConfig {
    /// ISO 4217 code of the currency receipts are issued in
    #[arg(long, env = "STOREFRONT_CURRENCY", default_value = "USD")]
    pub currency: String,
}

impl CheckoutConfig {
    /// Resolve the configured currency.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCurrency`] if the code is not a known currency.
    pub fn currency(&self) -> Result<&'static Currency, UnknownCurrency> {
        iso::find(&self.currency.to_uppercase()).ok_or_else(|| UnknownCurrency(self.currency.clone()))
    }
}
