//! Pricing

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors that can occur while converting amounts into money.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Amount could not be represented in the currency's minor units.
    #[error("amount {0} cannot be represented in minor units")]
    MinorUnitConversion(Decimal),
}

/// A cart discount that applies once the subtotal reaches `threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountTier {
    /// Minimum subtotal (inclusive)
    pub threshold: Decimal,

    /// Fraction of the subtotal taken off
    pub rate: Decimal,
}

/// Cart discount tiers, highest threshold first.
pub const DISCOUNT_TIERS: [DiscountTier; 2] = [
    DiscountTier {
        threshold: Decimal::from_parts(500, 0, 0, false, 0),
        rate: Decimal::from_parts(15, 0, 0, false, 2),
    },
    DiscountTier {
        threshold: Decimal::from_parts(100, 0, 0, false, 0),
        rate: Decimal::from_parts(10, 0, 0, false, 2),
    },
];

/// Returns the discount rate for a subtotal: the first tier it reaches, otherwise zero.
pub fn discount_rate(subtotal: Decimal) -> Decimal {
    DISCOUNT_TIERS
        .iter()
        .find(|tier| subtotal >= tier.threshold)
        .map_or(Decimal::ZERO, |tier| tier.rate)
}

/// Subtotal, tiered discount and net total of a cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartSummary {
    /// Sum of every line's discounted price
    pub subtotal: Decimal,

    /// Tiered cart discount
    pub discount: Decimal,

    /// `subtotal - discount`
    pub total: Decimal,
}

impl CartSummary {
    /// Build the summary for a subtotal.
    pub fn from_subtotal(subtotal: Decimal) -> Self {
        let discount = subtotal.saturating_mul(discount_rate(subtotal));

        Self {
            subtotal,
            discount,
            total: subtotal - discount,
        }
    }
}

/// Converts a decimal amount into money, rounding half away from zero to the
/// currency's minor unit.
///
/// # Errors
///
/// Returns [`PricingError::MinorUnitConversion`] if the scaled amount does not fit in an `i64`.
pub fn to_money(
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    let minor = amount
        .round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::from(10_u64.pow(currency.exponent)))
        .and_then(|scaled| scaled.to_i64())
        .ok_or(PricingError::MinorUnitConversion(amount))?;

    Ok(Money::from_minor(minor, currency))
}
