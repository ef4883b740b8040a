//! Favorites Models

use jiff::Timestamp;

use crate::{ids::TypedId, mirror::MirrorEntry, products::Product};

/// Favorite entry id, local to the favorites ledger.
pub type EntryId = TypedId<FavoriteEntry>;

/// Favorite Entry
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteEntry {
    /// Entry id
    pub id: EntryId,

    /// Snapshot of the product taken when it was favorited
    pub product: Product,

    /// When the product was favorited
    pub added_at: Timestamp,
}

impl MirrorEntry for FavoriteEntry {
    type Id = EntryId;

    fn mirror_id(&self) -> EntryId {
        self.id
    }
}
