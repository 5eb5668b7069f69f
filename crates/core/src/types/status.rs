//! Status enums for various entities.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Publication status of a catalog record in the admin editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CatalogStatus {
    #[default]
    Active,
    Draft,
    Archived,
}

impl fmt::Display for CatalogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Draft => write!(f, "draft"),
            Self::Archived => write!(f, "archived"),
        }
    }
}

impl FromStr for CatalogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "draft" => Ok(Self::Draft),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("invalid catalog status: {s}")),
        }
    }
}

/// What a verification token is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VerificationPurpose {
    /// Confirm ownership of an email address.
    #[default]
    EmailVerification,
    /// Authorize a password reset.
    PasswordReset,
    /// Confirm the buyer's email before releasing a digital order.
    OrderConfirmation,
}

impl VerificationPurpose {
    /// Human-readable label used in email subjects.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::EmailVerification => "email verification",
            Self::PasswordReset => "password reset",
            Self::OrderConfirmation => "order confirmation",
        }
    }
}

/// Lifecycle status of a verification token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Verified,
}
