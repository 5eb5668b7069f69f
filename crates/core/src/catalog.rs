//! Built-in catalog of offerings.
//!
//! The catalog is static data compiled into the binaries from
//! `data/catalog.json`, shaped as `category -> [offering]`. Prices are kept as
//! the display text from that file and only normalized when an offering goes
//! into a cart.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cart::CartProduct;
use crate::types::{Price, PriceInput, ProductId, ProductType};

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

/// One purchasable offering as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offering {
    pub id: ProductId,
    pub title: String,
    /// Display price, e.g. `"$1,200"`.
    pub price: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub use_case: String,
    #[serde(default)]
    pub image: String,
}

impl Offering {
    /// Canonical price.
    #[must_use]
    pub fn price(&self) -> Price {
        PriceInput::from(self.price.as_str()).normalize()
    }

    /// Cart input for this offering. The image URL travels with the line.
    #[must_use]
    pub fn to_cart_product(&self, product_type: ProductType) -> CartProduct {
        let product = CartProduct::new(
            self.id,
            product_type,
            self.title.clone(),
            self.price.as_str(),
        );
        if self.image.is_empty() {
            product
        } else {
            product.with_field("image", self.image.clone())
        }
    }
}

/// Offerings grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    categories: BTreeMap<ProductType, Vec<Offering>>,
}

impl Catalog {
    /// The catalog shipped with the binaries.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded JSON is malformed.
    pub fn builtin() -> Result<Self, serde_json::Error> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parse a catalog from `category -> [offering]` JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the catalog shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Categories that have at least one offering.
    pub fn categories(&self) -> impl Iterator<Item = ProductType> + '_ {
        self.categories
            .iter()
            .filter(|(_, offerings)| !offerings.is_empty())
            .map(|(category, _)| *category)
    }

    /// Offerings in one category, in catalog order.
    #[must_use]
    pub fn offerings(&self, category: ProductType) -> &[Offering] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every offering with its category.
    pub fn iter(&self) -> impl Iterator<Item = (ProductType, &Offering)> {
        self.categories.iter().flat_map(|(category, offerings)| {
            offerings.iter().map(move |offering| (*category, offering))
        })
    }

    /// Look up an offering by id within a category.
    #[must_use]
    pub fn find(&self, id: ProductId, category: ProductType) -> Option<&Offering> {
        self.offerings(category)
            .iter()
            .find(|offering| offering.id == id)
    }

    /// Total number of offerings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// Whether the catalog has no offerings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
