//! Canonical prices and the normalizer that produces them.
//!
//! Catalog data and persisted carts carry prices in whatever shape they were
//! written: `"$1,299.00"`, `300`, `null`. [`PriceInput`] captures those shapes
//! and [`PriceInput::normalize`] turns any of them into a [`Price`], a
//! non-negative decimal amount. Normalization is total: input that cannot be
//! read as a number becomes zero and is logged, it never fails.
//!
//! ```
//! use brightwire_core::{Price, PriceInput};
//! use rust_decimal::Decimal;
//!
//! let price = PriceInput::from("$1,299.50").normalize();
//! assert_eq!(price.amount(), Decimal::new(129_950, 2));
//! assert_eq!(price.to_string(), "$1,299.50");
//!
//! assert_eq!(PriceInput::from("call us").normalize(), Price::ZERO);
//! ```

use core::fmt;
use core::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize, Serializer};

/// A price as it arrives from a catalog, a form, or persisted cart data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    /// A plain number, e.g. `300` or `19.99`.
    Numeric(f64),
    /// Currency-formatted text, e.g. `"$1,299.00"`.
    Formatted(String),
    /// `null` or an absent value.
    Missing,
    /// Any other JSON value (booleans, arrays, objects).
    Other(serde_json::Value),
}

impl PriceInput {
    /// Normalize into a canonical [`Price`].
    ///
    /// Strings are stripped of everything except digits, `.` and `-`, and the
    /// longest leading number is read. Negative amounts clamp to zero.
    #[must_use]
    pub fn normalize(&self) -> Price {
        match self {
            Self::Numeric(value) => Price::from_number(*value),
            Self::Formatted(text) => parse_formatted(text).map_or_else(
                || {
                    tracing::warn!(price = %text, "unparsable price text, using 0");
                    Price::ZERO
                },
                Price::new,
            ),
            Self::Missing => Price::ZERO,
            Self::Other(value) => {
                tracing::warn!(price = %value, "unsupported price value, using 0");
                Price::ZERO
            }
        }
    }
}

impl From<f64> for PriceInput {
    fn from(value: f64) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for PriceInput {
    fn from(value: &str) -> Self {
        Self::Formatted(value.to_owned())
    }
}

impl From<String> for PriceInput {
    fn from(value: String) -> Self {
        Self::Formatted(value)
    }
}

impl From<Price> for PriceInput {
    fn from(price: Price) -> Self {
        Self::Formatted(price.amount().to_string())
    }
}

/// Read the leading number out of currency-formatted text.
fn parse_formatted(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let mut chars = cleaned.chars().peekable();
    let negative = chars.next_if_eq(&'-').is_some();

    let mut whole = String::new();
    while let Some(digit) = chars.next_if(char::is_ascii_digit) {
        whole.push(digit);
    }

    let mut fraction = String::new();
    if chars.next_if_eq(&'.').is_some() {
        while let Some(digit) = chars.next_if(char::is_ascii_digit) {
            fraction.push(digit);
        }
    }

    if whole.is_empty() && fraction.is_empty() {
        return None;
    }

    let mut literal = String::with_capacity(whole.len() + fraction.len() + 3);
    if negative {
        literal.push('-');
    }
    literal.push_str(if whole.is_empty() { "0" } else { &whole });
    if !fraction.is_empty() {
        literal.push('.');
        literal.push_str(&fraction);
    }

    // Only overflow can fail here: the literal is digits with at most one point.
    Decimal::from_str(&literal).ok().or_else(|| {
        tracing::warn!(price = %text, "price exceeds the representable range, saturating");
        Some(if negative { Decimal::MIN } else { Decimal::MAX })
    })
}

/// A canonical, non-negative price amount.
///
/// Serializes as a JSON number and deserializes from anything a
/// [`PriceInput`] accepts, so stored prices in any legacy shape load cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(from = "PriceInput")]
pub struct Price(Decimal);

impl Price {
    /// The zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, clamping negative amounts to zero.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        if amount.is_sign_negative() {
            Self::ZERO
        } else {
            Self(amount.normalize())
        }
    }

    /// Create a price from a floating-point number.
    ///
    /// `NaN`, infinities and negative values become zero.
    #[must_use]
    pub fn from_number(value: f64) -> Self {
        if !value.is_finite() {
            tracing::warn!(price = value, "non-finite price, using 0");
            return Self::ZERO;
        }
        Decimal::from_f64(value).map_or(Self::ZERO, Self::new)
    }

    /// The amount in the currency's standard unit.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price multiplied by a quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0
            .checked_mul(Decimal::from(quantity))
            .unwrap_or(Decimal::MAX)
    }
}

impl From<PriceInput> for Price {
    fn from(input: PriceInput) -> Self {
        input.normalize()
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0.to_f64().unwrap_or_default())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_money(self.0))
    }
}

/// Format an amount as dollars with thousands separators, e.g. `$1,234.50`.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    let rounded = round_cents(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((&text, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}${grouped}.{cents}", if negative { "-" } else { "" })
}

/// Round a monetary amount to cents, midpoint away from zero.
#[must_use]
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
