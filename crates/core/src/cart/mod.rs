//! Shopping cart store.
//!
//! [`CartStore`] owns an ordered list of [`CartItem`] lines, at most one per
//! `(id, type)` pair, and writes the whole list to its [`CartStorage`] after
//! every mutation. Construction hydrates from the same storage key.
//!
//! Nothing here returns an error to the caller:
//!
//! - unreadable or corrupt persisted data hydrates as an empty cart
//! - operations on lines that are not in the cart are no-ops
//! - storage write failures are logged and the in-memory cart stays
//!   authoritative for the rest of the session
//!
//! ```
//! use brightwire_core::cart::{CartProduct, CartStore, MemoryStorage};
//! use brightwire_core::{PricingCalculator, ProductId, ProductType};
//! use rust_decimal::Decimal;
//!
//! let mut cart = CartStore::open(MemoryStorage::new());
//! let audit = CartProduct::new(ProductId::new(1), ProductType::Service, "Website Audit", "$300");
//! cart.add(audit.clone());
//! cart.add(audit);
//!
//! assert_eq!(cart.len(), 1);
//! assert_eq!(cart.count(), 2);
//! let totals = cart.totals(&PricingCalculator::default());
//! assert_eq!(totals.total_with_tax, Decimal::from(738));
//! ```

mod storage;

pub use storage::{CartStorage, MemoryStorage, StorageError};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::pricing::{CartTotals, PricingCalculator};
use crate::types::{Price, PriceInput, ProductId, ProductType};

/// Storage key the cart is persisted under unless another is given.
pub const CART_STORAGE_KEY: &str = "cart";

/// Field names owned by [`CartItem`]. Pass-through fields never use them.
pub const RESERVED_FIELDS: [&str; 5] = ["id", "type", "title", "price", "quantity"];

/// A product being put into the cart, with its price as supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ProductId,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub title: String,
    #[serde(default = "missing_price")]
    pub price: PriceInput,
    /// Extra product fields carried into the cart line untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const fn missing_price() -> PriceInput {
    PriceInput::Missing
}

impl CartProduct {
    /// Build a product with no extra fields.
    pub fn new(
        id: ProductId,
        product_type: ProductType,
        title: impl Into<String>,
        price: impl Into<PriceInput>,
    ) -> Self {
        Self {
            id,
            product_type,
            title: title.into(),
            price: price.into(),
            extra: Map::new(),
        }
    }

    /// Attach a pass-through field. Reserved line fields are ignored.
    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        if RESERVED_FIELDS.contains(&key) {
            tracing::debug!(key, "ignored reserved pass-through field");
        } else {
            self.extra.insert(key.to_owned(), value.into());
        }
        self
    }
}

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: Price,
    /// Always at least 1.
    #[serde(default = "one", deserialize_with = "lenient_quantity")]
    pub quantity: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CartItem {
    /// Whether this line is for the given product.
    #[must_use]
    pub fn matches(&self, id: ProductId, product_type: ProductType) -> bool {
        self.id == id && self.product_type == product_type
    }

    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> rust_decimal::Decimal {
        self.price.times(self.quantity)
    }
}

const fn one() -> u32 {
    1
}

/// Read a stored quantity, clamping anything unusable into `1..=u32::MAX`.
fn lenient_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let quantity = value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .filter(|q| q.is_finite())
        .unwrap_or(1.0);
    Ok(truncate_quantity(quantity.max(1.0)))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to u32 range first
fn truncate_quantity(quantity: f64) -> u32 {
    quantity.trunc().clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Cart lines plus their persistence.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    key: String,
    items: Vec<CartItem>,
    count: u32,
}

impl<S: CartStorage> CartStore<S> {
    /// Open the cart persisted under [`CART_STORAGE_KEY`].
    pub fn open(storage: S) -> Self {
        Self::open_with_key(storage, CART_STORAGE_KEY)
    }

    /// Open the cart persisted under `key`.
    ///
    /// Missing or corrupt data yields an empty cart.
    pub fn open_with_key(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let items = hydrate(&storage, &key);
        let mut store = Self {
            storage,
            key,
            items,
            count: 0,
        };
        store.recount();
        store
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The line for a product, if present.
    #[must_use]
    pub fn get(&self, id: ProductId, product_type: ProductType) -> Option<&CartItem> {
        self.items.iter().find(|item| item.matches(id, product_type))
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total quantity across all lines, for badges.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// The storage key this cart persists under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The injected storage.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Add one unit of a product and return the line's new quantity.
    ///
    /// A product already in the cart keeps the price it was first added at;
    /// only its quantity goes up.
    pub fn add(&mut self, product: CartProduct) -> u32 {
        let quantity = if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.matches(product.id, product.product_type))
        {
            item.quantity = item.quantity.saturating_add(1);
            tracing::debug!(id = %item.id, product_type = %item.product_type, quantity = item.quantity, "incremented cart line");
            item.quantity
        } else {
            let price = product.price.normalize();
            tracing::debug!(id = %product.id, product_type = %product.product_type, %price, "added cart line");
            self.items.push(CartItem {
                id: product.id,
                product_type: product.product_type,
                title: product.title,
                price,
                quantity: 1,
                extra: pass_through(product.extra),
            });
            1
        };

        self.changed();
        quantity
    }

    /// Remove a product's line. Returns whether a line was removed.
    pub fn remove(&mut self, id: ProductId, product_type: ProductType) -> bool {
        let Some(index) = self.position(id, product_type) else {
            return false;
        };
        self.items.remove(index);
        self.changed();
        true
    }

    /// Set a line's quantity.
    ///
    /// Quantities below 1 are rejected rather than removing the line;
    /// fractional quantities are truncated. Returns whether a line changed.
    pub fn set_quantity(&mut self, id: ProductId, product_type: ProductType, quantity: f64) -> bool {
        if !quantity.is_finite() || quantity < 1.0 {
            tracing::debug!(%id, %product_type, quantity, "rejected cart quantity below 1");
            return false;
        }
        let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.matches(id, product_type))
        else {
            return false;
        };
        item.quantity = truncate_quantity(quantity);
        self.changed();
        true
    }

    /// Empty the cart and erase its persisted copy.
    pub fn clear(&mut self) {
        self.items.clear();
        self.count = 0;
        if let Err(e) = self.storage.remove(&self.key) {
            tracing::error!(key = %self.key, error = %e, "failed to erase persisted cart");
        }
    }

    /// Subtotal, tax and total for the current lines.
    #[must_use]
    pub fn totals(&self, calculator: &PricingCalculator) -> CartTotals {
        calculator.totals(&self.items)
    }

    fn position(&self, id: ProductId, product_type: ProductType) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.matches(id, product_type))
    }

    fn changed(&mut self) {
        self.recount();
        self.persist();
    }

    fn recount(&mut self) {
        self.count = self
            .items
            .iter()
            .fold(0u32, |sum, item| sum.saturating_add(item.quantity));
    }

    fn persist(&self) {
        let json = match serde_json::to_string(&self.items) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "failed to serialize cart");
                return;
            }
        };
        if let Err(e) = self.storage.save(&self.key, &json) {
            tracing::error!(key = %self.key, error = %e, "failed to persist cart");
        }
    }
}

/// Drop extra fields that would collide with a line's own fields.
fn pass_through(mut extra: Map<String, Value>) -> Map<String, Value> {
    extra.retain(|key, _| !RESERVED_FIELDS.contains(&key.as_str()));
    extra
}

fn hydrate<S: CartStorage>(storage: &S, key: &str) -> Vec<CartItem> {
    let raw = match storage.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::error!(key, error = %e, "failed to read persisted cart, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<CartItem>>(&raw) {
        Ok(items) => merge_duplicates(items),
        Err(e) => {
            tracing::warn!(key, error = %e, "persisted cart is corrupt, starting empty");
            Vec::new()
        }
    }
}

/// Fold repeated `(id, type)` lines into the first occurrence.
fn merge_duplicates(items: Vec<CartItem>) -> Vec<CartItem> {
    let mut merged: Vec<CartItem> = Vec::with_capacity(items.len());
    for item in items {
        if let Some(existing) = merged
            .iter_mut()
            .find(|line| line.matches(item.id, item.product_type))
        {
            tracing::warn!(id = %item.id, product_type = %item.product_type, "merged duplicate persisted cart line");
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            merged.push(item);
        }
    }
    merged
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use core::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;

    fn audit() -> CartProduct {
        CartProduct::new(ProductId::new(1), ProductType::Service, "Website Audit", "$300")
    }

    fn launch_bundle() -> CartProduct {
        CartProduct::new(ProductId::new(1), ProductType::Bundle, "Launch Bundle", "$1,999")
    }

    fn persisted(storage: &MemoryStorage) -> Vec<CartItem> {
        serde_json::from_str(&storage.get(CART_STORAGE_KEY).unwrap()).unwrap()
    }

    struct BrokenStorage;

    impl CartStorage for BrokenStorage {
        fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disk on fire".to_string()))
        }

        fn save(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk on fire".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk on fire".to_string()))
        }
    }

    #[test]
    fn test_add_same_product_twice_increments_quantity() {
        let mut cart = CartStore::open(MemoryStorage::new());
        assert_eq!(cart.add(audit()), 1);
        assert_eq!(cart.add(audit()), 2);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.count(), 2);
    }

    #[test]
    fn test_same_id_different_type_is_separate_line() {
        let mut cart = CartStore::open(MemoryStorage::new());
        cart.add(audit());
        cart.add(launch_bundle());

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[0].product_type, ProductType::Service);
        assert_eq!(cart.items()[1].product_type, ProductType::Bundle);
    }

    #[test]
    fn test_repeat_add_keeps_original_price() {
        let mut cart = CartStore::open(MemoryStorage::new());
        cart.add(audit());
        let mut repriced = audit();
        repriced.price = PriceInput::from("$10");
        cart.add(repriced);

        let line = cart.get(ProductId::new(1), ProductType::Service).unwrap();
        assert_eq!(line.price.amount(), Decimal::from(300));
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn test_add_normalizes_price_and_keeps_extra_fields() {
        let storage = MemoryStorage::new();
        let mut cart = CartStore::open(storage.clone());
        cart.add(
            CartProduct::new(ProductId::new(2), ProductType::Product, "Template Pack", "$49.50")
                .with_field("image", "/img/pack.webp"),
        );

        let stored = persisted(&storage);
        assert_eq!(stored[0].price.amount(), Decimal::from_str("49.5").unwrap());
        assert_eq!(stored[0].extra["image"], "/img/pack.webp");

        let raw: Value = serde_json::from_str(&storage.get(CART_STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(raw[0]["price"], 49.5);
        assert_eq!(raw[0]["type"], "product");
        assert_eq!(raw[0]["image"], "/img/pack.webp");
    }

    #[test]
    fn test_remove() {
        let storage = MemoryStorage::new();
        let mut cart = CartStore::open(storage.clone());
        cart.add(audit());
        cart.add(launch_bundle());

        assert!(cart.remove(ProductId::new(1), ProductType::Service));
        assert_eq!(cart.len(), 1);
        assert_eq!(persisted(&storage).len(), 1);

        assert!(!cart.remove(ProductId::new(99), ProductType::Service));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_set_quantity_below_one_is_rejected() {
        let mut cart = CartStore::open(MemoryStorage::new());
        cart.add(audit());
        cart.add(audit());

        assert!(!cart.set_quantity(ProductId::new(1), ProductType::Service, 0.0));
        assert!(!cart.set_quantity(ProductId::new(1), ProductType::Service, -3.0));
        assert!(!cart.set_quantity(ProductId::new(1), ProductType::Service, 0.5));
        assert!(!cart.set_quantity(ProductId::new(1), ProductType::Service, f64::NAN));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.count(), 2);
    }

    #[test]
    fn test_set_quantity_truncates() {
        let storage = MemoryStorage::new();
        let mut cart = CartStore::open(storage.clone());
        cart.add(audit());

        assert!(cart.set_quantity(ProductId::new(1), ProductType::Service, 4.9));
        assert_eq!(cart.count(), 4);
        assert_eq!(persisted(&storage)[0].quantity, 4);
    }

    #[test]
    fn test_set_quantity_on_missing_line_is_noop() {
        let storage = MemoryStorage::new();
        let mut cart = CartStore::open(storage.clone());

        assert!(!cart.set_quantity(ProductId::new(1), ProductType::Service, 3.0));
        assert!(cart.is_empty());
        assert!(!storage.contains(CART_STORAGE_KEY));
    }

    #[test]
    fn test_clear_erases_persisted_cart() {
        let storage = MemoryStorage::new();
        let mut cart = CartStore::open(storage.clone());
        cart.add(audit());
        cart.add(launch_bundle());
        assert!(storage.contains(CART_STORAGE_KEY));

        cart.clear();

        assert_eq!(cart.count(), 0);
        assert!(cart.is_empty());
        assert!(!storage.contains(CART_STORAGE_KEY));
        assert!(CartStore::open(storage).is_empty());
    }

    #[test]
    fn test_reserved_extra_fields_do_not_corrupt_persisted_cart() {
        let storage = MemoryStorage::new();
        let seo: CartProduct = serde_json::from_str(
            r#"{"id": 2, "type": "service", "title": "SEO", "price": "$50", "quantity": 5, "badge": "new"}"#,
        )
        .unwrap();
        assert_eq!(seo.extra["quantity"], 5);

        {
            let mut cart = CartStore::open(storage.clone());
            cart.add(audit());
            cart.add(seo);
        }

        let cart = CartStore::open(storage);
        assert_eq!(cart.len(), 2);
        let line = cart.get(ProductId::new(2), ProductType::Service).unwrap();
        assert_eq!(line.quantity, 1);
        assert_eq!(line.extra["badge"], "new");
        assert!(!line.extra.contains_key("quantity"));
    }

    #[test]
    fn test_with_field_ignores_reserved_keys() {
        let product = audit()
            .with_field("price", 1)
            .with_field("type", "bundle")
            .with_field("image", "/img/audit.webp");
        assert_eq!(product.extra.len(), 1);
        assert_eq!(product.extra["image"], "/img/audit.webp");
    }

    #[test]
    fn test_hydrates_previous_session() {
        let storage = MemoryStorage::new();
        {
            let mut cart = CartStore::open(storage.clone());
            cart.add(audit());
            cart.add(launch_bundle());
            cart.set_quantity(ProductId::new(1), ProductType::Bundle, 3.0);
        }

        let cart = CartStore::open(storage);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.count(), 4);
        assert_eq!(cart.items()[0].title, "Website Audit");
    }

    #[test]
    fn test_corrupt_storage_hydrates_empty() {
        let storage = MemoryStorage::with_entry(CART_STORAGE_KEY, "{not json");
        let cart = CartStore::open(storage);
        assert!(cart.is_empty());
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn test_hydration_repairs_legacy_records() {
        let legacy = r#"[
            {"id": 1, "type": "service", "title": "Website Audit", "price": "$300", "quantity": 0},
            {"id": 2, "type": "service", "title": "SEO", "price": {"bad": true}, "quantity": 2.7},
            {"id": 1, "type": "service", "title": "dupe", "price": 5, "quantity": 2}
        ]"#;
        let cart = CartStore::open(MemoryStorage::with_entry(CART_STORAGE_KEY, legacy));

        assert_eq!(cart.len(), 2);
        let audit = cart.get(ProductId::new(1), ProductType::Service).unwrap();
        assert_eq!(audit.quantity, 3);
        assert_eq!(audit.title, "Website Audit");
        assert_eq!(audit.price.amount(), Decimal::from(300));

        let seo = cart.get(ProductId::new(2), ProductType::Service).unwrap();
        assert_eq!(seo.quantity, 2);
        assert_eq!(seo.price, Price::ZERO);
        assert_eq!(cart.count(), 5);
    }

    #[test]
    fn test_storage_failures_do_not_surface() {
        let mut cart = CartStore::open(BrokenStorage);
        assert!(cart.is_empty());

        cart.add(audit());
        cart.add(audit());
        assert_eq!(cart.count(), 2);

        cart.clear();
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn test_custom_key() {
        let storage = MemoryStorage::new();
        let mut cart = CartStore::open_with_key(storage.clone(), "cart:guest");
        cart.add(audit());

        assert_eq!(cart.key(), "cart:guest");
        assert!(storage.contains("cart:guest"));
        assert!(!storage.contains(CART_STORAGE_KEY));
    }

    #[test]
    fn test_totals_scenario() {
        let mut cart = CartStore::open(MemoryStorage::new());
        cart.add(audit());
        cart.add(audit());

        let totals = cart.totals(&PricingCalculator::default());
        assert_eq!(totals.subtotal, Decimal::from(600));
        assert_eq!(totals.tax_amount, Decimal::from(138));
        assert_eq!(totals.total_with_tax, Decimal::from(738));
    }
}
