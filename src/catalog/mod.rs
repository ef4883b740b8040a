//! Catalog
//!
//! Remote product catalog access and the in-memory store that pages through it.

mod api;
mod errors;
mod store;

pub use api::{CatalogApi, Category, Cursor, HttpCatalogApi, MockCatalogApi};
pub use errors::CatalogError;
pub use store::CatalogStore;
