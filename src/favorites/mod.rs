//! Favorites

mod ledger;
pub mod models;
mod repository;

pub use ledger::FavoritesLedger;
pub use models::{EntryId, FavoriteEntry};
pub use repository::SqliteFavoritesRepository;
