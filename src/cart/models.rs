//! Cart Models

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::{ids::TypedId, mirror::MirrorEntry, products::Product};

/// Cart line id, local to the cart and never reused within a session.
pub type LineId = TypedId<CartLine>;

/// Cart Line
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// Line id
    pub id: LineId,

    /// Snapshot of the product taken when it was first added
    pub product: Product,

    /// Quantity, always positive
    pub quantity: u32,

    /// When the line was created
    pub added_at: Timestamp,
}

impl CartLine {
    /// Unit price after the product discount.
    pub fn unit_price(&self) -> Decimal {
        self.product.discounted_price()
    }

    /// Line total after the product discount, saturating at [`Decimal::MAX`].
    pub fn total_price(&self) -> Decimal {
        self.unit_price().saturating_mul(Decimal::from(self.quantity))
    }

    /// Line total before the product discount, saturating at [`Decimal::MAX`].
    pub fn original_total(&self) -> Decimal {
        self.product.price.saturating_mul(Decimal::from(self.quantity))
    }
}

impl MirrorEntry for CartLine {
    type Id = LineId;

    fn mirror_id(&self) -> LineId {
        self.id
    }
}
