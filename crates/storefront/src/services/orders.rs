//! Placed orders.
//!
//! Orders are kept in a bounded in-process cache so receipts can be fetched
//! again after checkout. They do not survive a restart.

use std::sync::Arc;

use brightwire_core::{Customer, Order};
use moka::future::Cache;
use serde::Serialize;
use uuid::Uuid;

const MAX_ORDERS: u64 = 10_000;

/// An order together with the customer who placed it.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    pub order: Order,
    pub customer: Customer,
}

/// Recently placed orders, keyed by order id.
#[derive(Clone)]
pub struct OrderBook {
    orders: Cache<Uuid, Arc<PlacedOrder>>,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new(MAX_ORDERS)
    }
}

impl OrderBook {
    /// Order book holding at most `capacity` orders.
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        Self {
            orders: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Record a placed order.
    pub async fn record(&self, order: Order, customer: Customer) -> Arc<PlacedOrder> {
        let placed = Arc::new(PlacedOrder { order, customer });
        self.orders.insert(placed.order.id, Arc::clone(&placed)).await;
        placed
    }

    /// Look up an order by id.
    pub async fn get(&self, id: Uuid) -> Option<Arc<PlacedOrder>> {
        self.orders.get(&id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use brightwire_core::{Email, PaymentMethod, PricingCalculator};

    use super::*;

    #[tokio::test]
    async fn test_record_and_get() {
        let book = OrderBook::default();
        let order = Order::place(Vec::new(), &PricingCalculator::default().totals(&[]), PaymentMethod::Card);
        let id = order.id;
        let customer = Customer {
            name: "Ada Lovelace".to_string(),
            email: Email::parse("ada@example.com").unwrap(),
        };

        book.record(order, customer).await;

        let placed = book.get(id).await.unwrap();
        assert_eq!(placed.customer.name, "Ada Lovelace");
        assert!(book.get(Uuid::new_v4()).await.is_none());
    }
}
