//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{CartLedger, CartLine, CartSnapshot, LineId},
    catalog::{CatalogApi, CatalogError, CatalogStore, Category, Cursor, HttpCatalogApi},
    checkout::{CheckoutDetails, CheckoutError, checkout},
    config::StorefrontConfig,
    context::{AppContext, AppInitError},
    favorites::{EntryId, FavoriteEntry, FavoritesLedger},
    filters::{FilterState, SortOrder},
    mirror::{Mirror, MirrorError},
    pricing::{CartSummary, PricingError},
    products::{Product, ProductId, ProductPage},
    receipt::{Receipt, ReceiptError},
};
