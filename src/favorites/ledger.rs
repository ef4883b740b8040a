//! Favorites Ledger

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    favorites::models::{EntryId, FavoriteEntry},
    ids::next_id_after,
    mirror::{self, Mirror, MirrorError, SyncHandle},
    products::{Product, ProductId},
};

/// Favorites Ledger
///
/// Holds at most one entry per product. Like the cart, every mutation
/// publishes the new entry list and queues a mirror resync.
#[derive(Debug)]
pub struct FavoritesLedger {
    entries: Vec<FavoriteEntry>,
    next_id: EntryId,
    sync: SyncHandle<FavoriteEntry>,
    updates: watch::Sender<Vec<FavoriteEntry>>,
}

impl FavoritesLedger {
    /// Restore the favorites from `mirror` and start their sync worker.
    ///
    /// # Errors
    ///
    /// Returns an error if the mirror cannot be read.
    pub async fn load(mirror: Arc<dyn Mirror<FavoriteEntry>>) -> Result<Self, MirrorError> {
        let stored = mirror.list_all().await?;
        let entries = sanitize(stored.clone());

        if entries.len() != stored.len() {
            warn!(
                dropped = stored.len() - entries.len(),
                "discarded duplicate favorites from the mirror"
            );
        }

        info!(entries = entries.len(), "favorites restored");

        let next_id = next_id_after(entries.iter().map(|entry| entry.id));
        let sync = SyncHandle::spawn("favorites", mirror, stored.clone());

        if entries != stored {
            sync.push(entries.clone());
        }

        let (updates, _) = watch::channel(entries.clone());

        Ok(Self {
            entries,
            next_id,
            sync,
            updates,
        })
    }

    /// Favorite `product`. Does nothing if it is already a favorite.
    ///
    /// Returns the id of the product's entry.
    pub fn add(&mut self, product: &Product) -> EntryId {
        if let Some(entry) = self.entry_for(product.id) {
            return entry.id;
        }

        let id = self.next_id;
        self.next_id = id.next();

        self.entries.push(FavoriteEntry {
            id,
            product: product.clone(),
            added_at: mirror::now(),
        });

        debug!(entry = %id, product = %product.id, "added to favorites");

        self.commit();

        id
    }

    /// Unfavorite `product`. Returns whether it was a favorite.
    pub fn remove(&mut self, product: ProductId) -> bool {
        self.remove_where(|entry| entry.product.id == product)
    }

    /// Remove an entry by its id. Returns whether it existed.
    pub fn remove_entry(&mut self, id: EntryId) -> bool {
        self.remove_where(|entry| entry.id == id)
    }

    /// Remove every favorite.
    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }

        self.entries.clear();

        debug!("favorites cleared");

        self.commit();
    }

    /// Whether `product` is a favorite.
    pub fn contains(&self, product: ProductId) -> bool {
        self.entry_for(product).is_some()
    }

    /// The entry for `product`, if any.
    pub fn entry_for(&self, product: ProductId) -> Option<&FavoriteEntry> {
        self.entries.iter().find(|entry| entry.product.id == product)
    }

    /// Entries ordered by entry id.
    pub fn entries(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    /// Favorited products, in the order they were added.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.entries.iter().map(|entry| &entry.product)
    }

    /// Number of favorites.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no favorites.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Subscribe to the entry list published after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<Vec<FavoriteEntry>> {
        self.updates.subscribe()
    }

    /// Wait until the mirror has caught up with every mutation so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the most recent resync failed or the sync worker has stopped.
    pub async fn flush(&self) -> Result<(), MirrorError> {
        self.sync.flush().await
    }

    fn remove_where(&mut self, predicate: impl Fn(&FavoriteEntry) -> bool) -> bool {
        let Some(position) = self.entries.iter().position(predicate) else {
            return false;
        };

        let removed = self.entries.remove(position);

        debug!(entry = %removed.id, product = %removed.product.id, "removed from favorites");

        self.commit();

        true
    }

    fn commit(&self) {
        self.sync.push(self.entries.clone());
        self.updates.send_replace(self.entries.clone());
    }
}

fn sanitize(mut entries: Vec<FavoriteEntry>) -> Vec<FavoriteEntry> {
    entries.sort_by_key(|entry| entry.id);

    let mut seen = FxHashSet::default();

    entries.retain(|entry| seen.insert(entry.product.id));

    entries
}
