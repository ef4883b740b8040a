//! Receipt

use std::io;

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{Alignment, Style, Theme, object::Columns},
};
use thiserror::Error;

use crate::{
    cart::CartLine,
    pricing::{CartSummary, PricingError, to_money},
};

/// Errors that can occur when building or printing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// An amount could not be converted into the receipt currency.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// One purchased cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    /// Product title
    pub title: String,

    /// Units purchased
    pub quantity: u32,

    /// Unit price after the product discount
    pub unit_price: Money<'static, Currency>,

    /// Line total after the product discount
    pub total: Money<'static, Currency>,
}

/// Receipt for a completed checkout.
#[derive(Debug, Clone)]
pub struct Receipt {
    customer: String,
    email: String,
    lines: Vec<ReceiptLine>,
    subtotal: Money<'static, Currency>,
    discount: Money<'static, Currency>,
    total: Money<'static, Currency>,
    currency: &'static Currency,
    placed_at: Timestamp,
}

impl Receipt {
    /// Build a receipt for `lines`, converting every amount into `currency`.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if an amount does not fit the currency's minor units.
    pub fn new(
        customer: &str,
        email: &str,
        lines: &[CartLine],
        summary: CartSummary,
        currency: &'static Currency,
        placed_at: Timestamp,
    ) -> Result<Self, ReceiptError> {
        let lines = lines
            .iter()
            .map(|line| {
                Ok(ReceiptLine {
                    title: line.product.title.clone(),
                    quantity: line.quantity,
                    unit_price: to_money(line.unit_price(), currency)?,
                    total: to_money(line.total_price(), currency)?,
                })
            })
            .collect::<Result<Vec<_>, ReceiptError>>()?;

        Ok(Self {
            customer: customer.to_string(),
            email: email.to_string(),
            lines,
            subtotal: to_money(summary.subtotal, currency)?,
            discount: to_money(summary.discount, currency)?,
            total: to_money(summary.total, currency)?,
            currency,
            placed_at,
        })
    }

    /// Buyer name
    pub fn customer(&self) -> &str {
        &self.customer
    }

    /// Buyer email
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Purchased lines, in cart order
    pub fn lines(&self) -> &[ReceiptLine] {
        &self.lines
    }

    /// Sum of line totals
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.subtotal
    }

    /// Tiered cart discount
    pub fn discount(&self) -> Money<'static, Currency> {
        self.discount
    }

    /// Amount charged
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// Currency used for all monetary values.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// When the order was placed.
    pub fn placed_at(&self) -> Timestamp {
        self.placed_at
    }

    /// Prints the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        writeln!(out, "\nOrder for {} <{}>", self.customer, self.email)
            .map_err(|_err| ReceiptError::IO)?;
        writeln!(out, "Placed at {}", self.placed_at).map_err(|_err| ReceiptError::IO)?;

        self.write_table(&mut out)?;
        self.write_summary(&mut out)?;

        Ok(())
    }

    fn write_table(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Qty", "Unit Price", "Total"]);

        for (idx, line) in self.lines.iter().enumerate() {
            builder.push_record([
                format!("#{:<3}", idx + 1),
                line.title.clone(),
                line.quantity.to_string(),
                format!("{}", line.unit_price),
                format!("{}", line.total),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Columns::new(2..5), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let rows = [
            (" Subtotal:", format!("{}  ", self.subtotal)),
            (" Discount:", format!("-{}  ", self.discount)),
            (" Total:", format!("{}  ", self.total)),
        ];

        let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

        for (label, value) in &rows {
            writeln!(out, "{label:<label_width$} {value:>value_width$}")
                .map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;
    use crate::{cart::LineId, test_support::product};

    fn lines() -> Vec<CartLine> {
        vec![
            CartLine {
                id: LineId::new(1),
                product: product(1, "Lamp", Decimal::from(100), Decimal::ZERO),
                quantity: 1,
                added_at: Timestamp::UNIX_EPOCH,
            },
            CartLine {
                id: LineId::new(2),
                product: product(2, "Desk Mat", Decimal::from(50), Decimal::from(50)),
                quantity: 2,
                added_at: Timestamp::UNIX_EPOCH,
            },
        ]
    }

    fn receipt() -> Result<Receipt, ReceiptError> {
        let lines = lines();
        let subtotal = lines.iter().map(CartLine::total_price).sum();

        Receipt::new(
            "Ada",
            "ada@example.com",
            &lines,
            CartSummary::from_subtotal(subtotal),
            iso::USD,
            Timestamp::UNIX_EPOCH,
        )
    }

    #[test]
    fn amounts_are_converted_to_money() -> TestResult {
        let receipt = receipt()?;

        assert_eq!(receipt.subtotal(), Money::from_minor(15_000, iso::USD));
        assert_eq!(receipt.discount(), Money::from_minor(1_500, iso::USD));
        assert_eq!(receipt.total(), Money::from_minor(13_500, iso::USD));

        let mat = receipt.lines().get(1).ok_or("missing line")?;

        assert_eq!(mat.unit_price, Money::from_minor(2_500, iso::USD));
        assert_eq!(mat.total, Money::from_minor(5_000, iso::USD));

        Ok(())
    }

    #[test]
    fn written_receipt_lists_lines_and_totals() -> TestResult {
        let mut out = Vec::new();

        receipt()?.write_to(&mut out)?;

        let text = String::from_utf8(out)?;

        assert!(text.contains("Ada <ada@example.com>"), "{text}");
        assert!(text.contains("Desk Mat"), "{text}");
        assert!(text.contains("$135.00"), "{text}");
        assert!(text.contains("-$15.00"), "{text}");

        Ok(())
    }
}
