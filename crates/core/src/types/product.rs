//! Product categories.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Category discriminator for purchasable offerings.
///
/// Product IDs are only unique within a category, so cart lines and admin
/// records are always keyed by `(ProductId, ProductType)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    /// A one-off professional service.
    Service,
    /// A package of several services sold together.
    Bundle,
    /// A standalone digital product.
    Product,
}

impl ProductType {
    /// All categories, in display order.
    pub const ALL: [Self; 3] = [Self::Service, Self::Bundle, Self::Product];

    /// Stable lowercase name used in URLs and persisted data.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Bundle => "bundle",
            Self::Product => "product",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`ProductType`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown product type: {0}")]
pub struct UnknownProductType(pub String);

impl FromStr for ProductType {
    type Err = UnknownProductType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "service" | "services" => Ok(Self::Service),
            "bundle" | "bundles" => Ok(Self::Bundle),
            "product" | "products" => Ok(Self::Product),
            _ => Err(UnknownProductType(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_plural_and_case() {
        assert_eq!("Services".parse::<ProductType>().unwrap(), ProductType::Service);
        assert_eq!("bundle".parse::<ProductType>().unwrap(), ProductType::Bundle);
        assert!("gift".parse::<ProductType>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&ProductType::Bundle).unwrap(),
            "\"bundle\""
        );
        let parsed: ProductType = serde_json::from_str("\"service\"").unwrap();
        assert_eq!(parsed, ProductType::Service);
    }
}
