//! Cart pricing: subtotal, tax and total.
//!
//! Totals are derived on every call from the cart lines; nothing is cached.
//! Prices on [`CartItem`]s are already canonical, so a line whose source price
//! was malformed simply contributes zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::CartItem;
use crate::types::price::round_cents;

/// Default sales tax rate (23%).
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(23, 0, 0, false, 2);

/// Errors creating a [`PricingCalculator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("tax rate must be between 0 and 1, got {0}")]
    InvalidTaxRate(Decimal),
}

/// Derived money values for a set of cart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_with_tax: Decimal,
}

impl CartTotals {
    /// Totals with the money fields rounded to cents.
    ///
    /// The total is recomputed from the rounded parts so that
    /// `subtotal + tax_amount == total_with_tax` holds on receipts.
    #[must_use]
    pub fn rounded(&self) -> Self {
        let subtotal = round_cents(self.subtotal);
        let tax_amount = round_cents(self.tax_amount);
        Self {
            subtotal,
            tax_rate: self.tax_rate,
            tax_amount,
            total_with_tax: subtotal.saturating_add(tax_amount),
        }
    }
}

/// Computes [`CartTotals`] at a fixed tax rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingCalculator {
    tax_rate: Decimal,
}

impl Default for PricingCalculator {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
        }
    }
}

impl PricingCalculator {
    /// Create a calculator for a tax rate expressed as a fraction (0.23 = 23%).
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidTaxRate`] if the rate is outside `0..=1`.
    pub fn new(tax_rate: Decimal) -> Result<Self, PricingError> {
        if tax_rate.is_sign_negative() || tax_rate > Decimal::ONE {
            return Err(PricingError::InvalidTaxRate(tax_rate));
        }
        Ok(Self { tax_rate })
    }

    /// The configured tax rate.
    #[must_use]
    pub const fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub fn subtotal(&self, items: &[CartItem]) -> Decimal {
        items
            .iter()
            .fold(Decimal::ZERO, |sum, item| sum.saturating_add(item.line_total()))
    }

    /// Subtotal, tax and total for `items`.
    #[must_use]
    pub fn totals(&self, items: &[CartItem]) -> CartTotals {
        let subtotal = self.subtotal(items);
        let tax_amount = subtotal.saturating_mul(self.tax_rate);
        CartTotals {
            subtotal,
            tax_rate: self.tax_rate,
            tax_amount,
            total_with_tax: subtotal.saturating_add(tax_amount),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use core::str::FromStr;

    use serde_json::Map;

    use super::*;
    use crate::types::{Price, ProductId, ProductType};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(id: i32, price: &str, quantity: u32) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            product_type: ProductType::Service,
            title: format!("Item {id}"),
            price: Price::new(dec(price)),
            quantity,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_empty_cart_is_zero() {
        let totals = PricingCalculator::default().totals(&[]);
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.tax_amount, Decimal::ZERO);
        assert_eq!(totals.total_with_tax, Decimal::ZERO);
        assert_eq!(totals.tax_rate, dec("0.23"));
    }

    #[test]
    fn test_subtotal_sums_price_times_quantity() {
        let items = [line(1, "300", 2), line(2, "49.50", 3), line(3, "0", 5)];
        let calculator = PricingCalculator::default();
        assert_eq!(calculator.subtotal(&items), dec("748.50"));
    }

    #[test]
    fn test_total_is_subtotal_times_one_plus_rate() {
        let items = [line(1, "19.99", 3), line(2, "1299", 1)];
        let totals = PricingCalculator::default().totals(&items);
        assert_eq!(totals.subtotal, dec("1358.97"));
        assert_eq!(totals.tax_amount, dec("312.5631"));
        assert_eq!(totals.total_with_tax, totals.subtotal * dec("1.23"));
    }

    #[test]
    fn test_rounded_totals_add_up() {
        let items = [line(1, "19.99", 3), line(2, "1299", 1)];
        let rounded = PricingCalculator::default().totals(&items).rounded();
        assert_eq!(rounded.tax_amount, dec("312.56"));
        assert_eq!(rounded.total_with_tax, dec("1671.53"));
        assert_eq!(rounded.subtotal + rounded.tax_amount, rounded.total_with_tax);
    }

    #[test]
    fn test_custom_tax_rate() {
        let calculator = PricingCalculator::new(dec("0.08")).unwrap();
        let totals = calculator.totals(&[line(1, "100", 1)]);
        assert_eq!(totals.tax_amount, dec("8"));
        assert_eq!(totals.total_with_tax, dec("108"));
    }

    #[test]
    fn test_invalid_tax_rate() {
        assert!(PricingCalculator::new(dec("-0.1")).is_err());
        assert!(PricingCalculator::new(dec("1.5")).is_err());
        assert!(PricingCalculator::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_totals_serialize_camel_case_numbers() {
        let totals = PricingCalculator::default().totals(&[line(1, "300", 2)]);
        let json = serde_json::to_value(totals).unwrap();
        assert_eq!(json["subtotal"], 600.0);
        assert_eq!(json["taxRate"], 0.23);
        assert_eq!(json["taxAmount"], 138.0);
        assert_eq!(json["totalWithTax"], 738.0);
    }
}
