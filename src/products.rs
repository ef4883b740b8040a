//! Products

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::TypedId;

/// Product Id, assigned by the remote catalog.
pub type ProductId = TypedId<Product>;

/// Product
///
/// An immutable catalog entry. Ledgers embed a copy of the product taken when it
/// was added, so later catalog changes never alter a cart line or favorite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product id
    pub id: ProductId,

    /// Product title
    pub title: String,

    /// Product description
    pub description: String,

    /// Base price, before the product discount
    pub price: Decimal,

    /// Discount percentage in the range `0..=100`
    pub discount_percentage: Decimal,

    /// Rating in the range `0.0..=5.0`
    pub rating: f64,

    /// Units in stock
    pub stock: u32,

    /// Brand, when the catalog knows one
    #[serde(default)]
    pub brand: Option<String>,

    /// Category slug
    pub category: String,

    /// Thumbnail URL
    pub thumbnail: String,

    /// Image URLs
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// Unit price after the product discount: `price * (1 - discount / 100)`.
    pub fn discounted_price(&self) -> Decimal {
        self.price
            .saturating_mul(Decimal::ONE - self.discount_percentage / Decimal::ONE_HUNDRED)
    }
}

/// One page of the remote catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    /// Products on this page
    pub products: Vec<Product>,

    /// Total number of products available remotely
    pub total: u32,

    /// Offset this page starts at
    pub skip: u32,

    /// Requested page size
    pub limit: u32,
}
