//! Cart

mod ledger;
pub mod models;
mod repository;

pub use ledger::{CartLedger, CartSnapshot};
pub use models::{CartLine, LineId};
pub use repository::SqliteCartRepository;
