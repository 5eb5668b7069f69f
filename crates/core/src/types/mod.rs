//! Core types for the Brightwire storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceInput, format_money};
pub use product::{ProductType, UnknownProductType};
pub use status::*;
