//! App Context

use std::sync::Arc;

use rusty_money::iso::Currency;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::{
    cart::{CartLedger, SqliteCartRepository},
    catalog::{CatalogApi, CatalogError, CatalogStore, HttpCatalogApi},
    checkout::{self, CheckoutDetails, CheckoutError},
    config::{StorefrontConfig, checkout::UnknownCurrency},
    database,
    favorites::{FavoritesLedger, SqliteFavoritesRepository},
    mirror::MirrorError,
    receipt::Receipt,
};

/// Errors raised while building the application context.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// The mirror database could not be opened.
    #[error("failed to open mirror database")]
    Database(#[source] MirrorError),

    /// A ledger could not be restored from its mirror.
    #[error("failed to restore {ledger} from the mirror")]
    Restore {
        /// Ledger name
        ledger: &'static str,

        /// Underlying mirror error
        #[source]
        source: MirrorError,
    },

    /// The catalog client could not be built.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The configured currency is unknown.
    #[error(transparent)]
    Currency(#[from] UnknownCurrency),
}

/// The storefront services, owned together.
#[derive(Debug)]
pub struct AppContext {
    /// Remote catalog and filter state
    pub catalog: CatalogStore,

    /// Shopping cart
    pub cart: CartLedger,

    /// Favorite products
    pub favorites: FavoritesLedger,

    currency: &'static Currency,
    pool: SqlitePool,
}

impl AppContext {
    /// Build the context described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the currency is unknown, the HTTP client cannot be
    /// built or the mirror cannot be opened and restored.
    pub async fn from_config(config: &StorefrontConfig) -> Result<Self, AppInitError> {
        let currency = config.checkout.currency()?;

        let api = HttpCatalogApi::new(
            &config.catalog.api_base_url,
            config.catalog.request_timeout(),
        )?;

        let pool = database::connect(&config.database.database_url)
            .await
            .map_err(AppInitError::Database)?;

        Self::with_parts(Arc::new(api), pool, config.catalog.page_size, currency).await
    }

    /// Build a context from an already opened database and catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if either ledger cannot be restored.
    pub async fn with_parts(
        api: Arc<dyn CatalogApi>,
        pool: SqlitePool,
        page_size: u32,
        currency: &'static Currency,
    ) -> Result<Self, AppInitError> {
        let cart = CartLedger::load(Arc::new(SqliteCartRepository::new(pool.clone())))
            .await
            .map_err(|source| AppInitError::Restore {
                ledger: "cart",
                source,
            })?;

        let favorites = FavoritesLedger::load(Arc::new(SqliteFavoritesRepository::new(pool.clone())))
            .await
            .map_err(|source| AppInitError::Restore {
                ledger: "favorites",
                source,
            })?;

        info!(
            cart_lines = cart.len(),
            favorites = favorites.len(),
            currency = currency.iso_alpha_code,
            "storefront ready"
        );

        Ok(Self {
            catalog: CatalogStore::new(api, page_size),
            cart,
            favorites,
            currency,
            pool,
        })
    }

    /// Currency receipts are issued in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Check out the cart.
    ///
    /// # Errors
    ///
    /// See [`checkout::checkout`].
    pub fn checkout(&mut self, details: &CheckoutDetails) -> Result<Receipt, CheckoutError> {
        checkout::checkout(&mut self.cart, details, self.currency)
    }

    /// Wait for both mirrors to catch up, then close the database.
    ///
    /// # Errors
    ///
    /// Returns the first mirror that failed to sync.
    pub async fn shutdown(self) -> Result<(), MirrorError> {
        let cart = self.cart.flush().await;
        let favorites = self.favorites.flush().await;

        drop(self.cart);
        drop(self.favorites);

        self.pool.close().await;

        cart.and(favorites)
    }
}
