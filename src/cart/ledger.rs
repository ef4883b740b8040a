//! Cart Ledger

use std::sync::Arc;

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    cart::models::{CartLine, LineId},
    ids::next_id_after,
    mirror::{self, Mirror, MirrorError, SyncHandle},
    pricing::CartSummary,
    products::{Product, ProductId},
};

/// Published state of the cart after a mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartSnapshot {
    /// Lines ordered by line id
    pub lines: Vec<CartLine>,

    /// Sum of all line quantities
    pub total_quantity: u64,

    /// Subtotal, discount and total
    pub summary: CartSummary,
}

/// Cart Ledger
///
/// Owns the cart lines. Mutations apply in memory immediately; each one
/// publishes a [`CartSnapshot`] and queues a resync of the mirror.
#[derive(Debug)]
pub struct CartLedger {
    lines: Vec<CartLine>,
    next_id: LineId,
    sync: SyncHandle<CartLine>,
    updates: watch::Sender<CartSnapshot>,
}

impl CartLedger {
    /// Restore the cart from `mirror` and start its sync worker.
    ///
    /// Stored lines are de-duplicated by product (first line wins) and lines
    /// without a positive quantity are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the mirror cannot be read.
    pub async fn load(mirror: Arc<dyn Mirror<CartLine>>) -> Result<Self, MirrorError> {
        let stored = mirror.list_all().await?;
        let lines = sanitize(stored.clone());

        if lines.len() != stored.len() {
            warn!(
                dropped = stored.len() - lines.len(),
                "discarded invalid cart lines from the mirror"
            );
        }

        info!(lines = lines.len(), "cart restored");

        let next_id = next_id_after(lines.iter().map(|line| line.id));
        let sync = SyncHandle::spawn("cart", mirror, stored.clone());

        if lines != stored {
            sync.push(lines.clone());
        }

        let (updates, _) = watch::channel(snapshot_of(&lines));

        Ok(Self {
            lines,
            next_id,
            sync,
            updates,
        })
    }

    /// Add `quantity` units of `product`, merging into the product's existing
    /// line if there is one. Stock is not checked.
    ///
    /// Returns the affected line, or `None` when `quantity` is zero.
    pub fn add(&mut self, product: &Product, quantity: u32) -> Option<LineId> {
        if quantity == 0 {
            return None;
        }

        let id = match self.lines.iter_mut().find(|line| line.product.id == product.id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(quantity);
                line.id
            }
            None => {
                let id = self.allocate_id();

                self.lines.push(CartLine {
                    id,
                    product: product.clone(),
                    quantity,
                    added_at: mirror::now(),
                });

                id
            }
        };

        debug!(line = %id, product = %product.id, quantity, "added to cart");

        self.commit();

        Some(id)
    }

    /// Remove a line. Returns whether it existed.
    pub fn remove(&mut self, id: LineId) -> bool {
        let before = self.lines.len();

        self.lines.retain(|line| line.id != id);

        if self.lines.len() == before {
            return false;
        }

        debug!(line = %id, "removed from cart");

        self.commit();

        true
    }

    /// Overwrite a line's quantity. A quantity of zero or less removes the
    /// line; quantities beyond `u32::MAX` saturate.
    ///
    /// Returns whether the line existed.
    pub fn set_quantity(&mut self, id: LineId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(id);
        }

        let Some(line) = self.lines.iter_mut().find(|line| line.id == id) else {
            return false;
        };

        line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        debug!(line = %id, quantity = line.quantity, "cart quantity set");

        self.commit();

        true
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        if self.lines.is_empty() {
            return;
        }

        self.lines.clear();

        debug!("cart cleared");

        self.commit();
    }

    /// Lines ordered by line id.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up a line by id.
    pub fn line(&self, id: LineId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// The line holding `product`, if any.
    pub fn line_for(&self, product: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id == product)
    }

    /// Whether `product` is in the cart.
    pub fn contains(&self, product: ProductId) -> bool {
        self.line_for(product).is_some()
    }

    /// Units of `product` in the cart, zero when absent.
    pub fn quantity_of(&self, product: ProductId) -> u32 {
        self.line_for(product).map_or(0, |line| line.quantity)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line quantities.
    pub fn total_quantity(&self) -> u64 {
        total_quantity(&self.lines)
    }

    /// Sum of all line totals after product discounts.
    pub fn total_price(&self) -> Decimal {
        total_price(&self.lines)
    }

    /// Subtotal, tiered discount and total.
    pub fn summary(&self) -> CartSummary {
        CartSummary::from_subtotal(self.total_price())
    }

    /// Current state of the cart.
    pub fn snapshot(&self) -> CartSnapshot {
        snapshot_of(&self.lines)
    }

    /// Subscribe to the snapshots published after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
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

    fn allocate_id(&mut self) -> LineId {
        let id = self.next_id;
        self.next_id = id.next();

        id
    }

    fn commit(&self) {
        self.sync.push(self.lines.clone());
        self.updates.send_replace(self.snapshot());
    }
}

fn sanitize(mut lines: Vec<CartLine>) -> Vec<CartLine> {
    lines.sort_by_key(|line| line.id);

    let mut seen = FxHashSet::default();

    lines.retain(|line| line.quantity > 0 && seen.insert(line.product.id));

    lines
}

fn total_quantity(lines: &[CartLine]) -> u64 {
    lines.iter().map(|line| u64::from(line.quantity)).sum()
}

fn total_price(lines: &[CartLine]) -> Decimal {
    lines
        .iter()
        .map(CartLine::total_price)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

fn snapshot_of(lines: &[CartLine]) -> CartSnapshot {
    CartSnapshot {
        lines: lines.to_vec(),
        total_quantity: total_quantity(lines),
        summary: CartSummary::from_subtotal(total_price(lines)),
    }
}
