//! Orders and the customers who place them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::CartItem;
use crate::pricing::CartTotals;
use crate::types::Email;

/// How the buyer chose to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Paypal,
    BankTransfer,
}

impl PaymentMethod {
    /// Label shown on receipts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Card => "Credit card",
            Self::Paypal => "PayPal",
            Self::BankTransfer => "Bank transfer",
        }
    }
}

/// The person an order's receipt is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: Email,
}

/// A placed order: a frozen copy of the cart with its totals rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub items: Vec<CartItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub payment_method: PaymentMethod,
}

impl Order {
    /// Freeze cart lines and their totals into a new order.
    #[must_use]
    pub fn place(items: Vec<CartItem>, totals: &CartTotals, payment_method: PaymentMethod) -> Self {
        let totals = totals.rounded();
        Self {
            id: Uuid::new_v4(),
            items,
            subtotal: totals.subtotal,
            tax_rate: totals.tax_rate,
            tax: totals.tax_amount,
            total: totals.total_with_tax,
            created_at: Utc::now(),
            payment_method,
        }
    }

    /// Total number of units ordered.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |sum, item| sum.saturating_add(item.quantity))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::Map;

    use super::*;
    use crate::pricing::PricingCalculator;
    use crate::types::{Price, ProductId, ProductType};

    #[test]
    fn test_place_rounds_totals() {
        let items = vec![CartItem {
            id: ProductId::new(1),
            product_type: ProductType::Product,
            title: "Email Template Pack".to_string(),
            price: Price::new(Decimal::new(4950, 2)),
            quantity: 3,
            extra: Map::new(),
        }];
        let totals = PricingCalculator::default().totals(&items);
        let order = Order::place(items, &totals, PaymentMethod::Card);

        assert_eq!(order.subtotal, Decimal::new(14850, 2));
        assert_eq!(order.tax, Decimal::new(3416, 2));
        assert_eq!(order.total, Decimal::new(18266, 2));
        assert_eq!(order.unit_count(), 3);
    }

    #[test]
    fn test_payment_method_serde() {
        let json = serde_json::to_string(&PaymentMethod::BankTransfer).unwrap();
        assert_eq!(json, "\"bank_transfer\"");
    }
}
