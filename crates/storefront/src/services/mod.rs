//! Business logic services for storefront.
//!
//! # Services
//!
//! - `carts` - Session carts hydrated from the filesystem
//! - `orders` - Recently placed orders
//! - `receipt` - Plain-text receipts
//! - `verification` - Email verification tokens
//! - `email` - SMTP delivery of codes and receipts

pub mod carts;
pub mod email;
pub mod orders;
pub mod receipt;
pub mod verification;

pub use carts::{CartError, CartRegistry, SessionCart};
pub use email::{EmailError, EmailService};
pub use orders::{OrderBook, PlacedOrder};
pub use receipt::render_receipt;
pub use verification::{VerificationError, VerificationStore};
