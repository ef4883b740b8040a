//! Checkout
//!
//! Validates the buyer's details, prices the cart into a [`Receipt`] and empties it.

use std::sync::LazyLock;

use regex::Regex;
use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::info;

use crate::{
    cart::CartLedger,
    receipt::{Receipt, ReceiptError},
};

/// Minimum number of characters in a phone number, after trimming.
pub const MIN_PHONE_LEN: usize = 10;

#[expect(clippy::expect_used, reason = "the pattern is a literal and always compiles")]
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+._%\-]{1,256}@[A-Za-z0-9][A-Za-z0-9\-]{0,64}(\.[A-Za-z0-9][A-Za-z0-9\-]{0,25})+$")
        .expect("email pattern is valid")
});

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Name is blank.
    #[error("name is required")]
    MissingName,

    /// Email does not look like an address.
    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),

    /// Phone number is too short.
    #[error("phone number must have at least {} characters", MIN_PHONE_LEN)]
    InvalidPhone,

    /// Nothing to buy.
    #[error("cart is empty")]
    EmptyCart,

    /// Totals could not be priced.
    #[error(transparent)]
    Receipt(#[from] ReceiptError),
}

/// Buyer details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutDetails {
    /// Full name
    pub name: String,

    /// Email address
    pub email: String,

    /// Phone number
    pub phone: String,
}

impl CheckoutDetails {
    /// Check every field, reporting the first that is invalid.
    ///
    /// # Errors
    ///
    /// Returns the [`CheckoutError`] for the first invalid field.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.name.trim().is_empty() {
            return Err(CheckoutError::MissingName);
        }

        let email = self.email.trim();

        if !EMAIL_PATTERN.is_match(email) {
            return Err(CheckoutError::InvalidEmail(email.to_string()));
        }

        if self.phone.trim().chars().count() < MIN_PHONE_LEN {
            return Err(CheckoutError::InvalidPhone);
        }

        Ok(())
    }
}

/// Place an order for everything in `cart`.
///
/// On success the cart is cleared and the receipt returned.
///
/// # Errors
///
/// Returns an error if the details are invalid, the cart is empty, or the
/// totals cannot be expressed in `currency`. The cart is left untouched.
pub fn checkout(
    cart: &mut CartLedger,
    details: &CheckoutDetails,
    currency: &'static Currency,
) -> Result<Receipt, CheckoutError> {
    details.validate()?;

    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let receipt = Receipt::new(
        details.name.trim(),
        details.email.trim(),
        cart.lines(),
        cart.summary(),
        currency,
        crate::mirror::now(),
    )?;

    info!(
        lines = receipt.lines().len(),
        total = %receipt.total(),
        "order placed"
    );

    cart.clear();

    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use rusty_money::{Money, iso};
    use testresult::TestResult;

    use super::*;
    use crate::{cart::SqliteCartRepository, database, test_support::product};

    fn details() -> CheckoutDetails {
        CheckoutDetails {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "0555 123 45 67".to_string(),
        }
    }

    async fn cart() -> Result<CartLedger, Box<dyn std::error::Error>> {
        let pool = database::connect_in_memory().await?;

        Ok(CartLedger::load(Arc::new(SqliteCartRepository::new(pool))).await?)
    }

    #[test]
    fn valid_details_pass() -> TestResult {
        details().validate()?;

        Ok(())
    }

    #[test]
    fn blank_name_is_rejected() {
        let details = CheckoutDetails {
            name: "   ".to_string(),
            ..details()
        };

        assert!(matches!(details.validate(), Err(CheckoutError::MissingName)));
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in ["", "ada", "ada@", "@example.com", "ada@example", "ada @example.com"] {
            let details = CheckoutDetails {
                email: email.to_string(),
                ..details()
            };

            assert!(
                matches!(details.validate(), Err(CheckoutError::InvalidEmail(_))),
                "{email:?} should be rejected"
            );
        }
    }

    #[test]
    fn short_phone_is_rejected() {
        let details = CheckoutDetails {
            phone: "  555 1234 ".to_string(),
            ..details()
        };

        assert!(matches!(details.validate(), Err(CheckoutError::InvalidPhone)));
    }

    #[test]
    fn first_invalid_field_is_reported() {
        let details = CheckoutDetails {
            name: String::new(),
            email: "nope".to_string(),
            phone: String::new(),
        };

        assert!(matches!(details.validate(), Err(CheckoutError::MissingName)));
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() -> TestResult {
        let mut cart = cart().await?;

        let result = checkout(&mut cart, &details(), iso::USD);

        assert!(matches!(result, Err(CheckoutError::EmptyCart)));

        Ok(())
    }

    #[tokio::test]
    async fn checkout_prices_and_clears_cart() -> TestResult {
        let mut cart = cart().await?;

        cart.add(&product(1, "A", Decimal::from(100), Decimal::ZERO), 1);
        cart.add(&product(2, "B", Decimal::from(50), Decimal::from(50)), 2);

        let receipt = checkout(&mut cart, &details(), iso::USD)?;

        assert_eq!(receipt.total(), Money::from_minor(13_500, iso::USD));
        assert_eq!(receipt.lines().len(), 2);
        assert!(cart.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn invalid_details_leave_cart_untouched() -> TestResult {
        let mut cart = cart().await?;

        cart.add(&product(1, "A", Decimal::from(100), Decimal::ZERO), 1);

        let invalid = CheckoutDetails {
            phone: "123".to_string(),
            ..details()
        };

        assert!(checkout(&mut cart, &invalid, iso::USD).is_err());
        assert_eq!(cart.len(), 1);

        Ok(())
    }
}
