//! Brightwire Core - shared types, cart store and pricing.
//!
//! This crate is used by both binaries:
//! - `storefront` - Public catalog, cart, checkout and verification API
//! - `admin` - Internal catalog editor API
//!
//! # Architecture
//!
//! The core crate holds types, pure logic and traits. It never touches the
//! network; the only I/O seam is [`cart::CartStorage`], implemented over the
//! filesystem by the storefront.
//!
//! # Modules
//!
//! - [`types`] - IDs, email, prices and status enums
//! - [`cart`] - Cart store with pluggable persistence
//! - [`pricing`] - Subtotal, tax and total calculation
//! - [`catalog`] - Built-in catalog of services, bundles and products
//! - [`order`] - Orders, customers and payment methods
//! - [`security`] - Constant-time secret comparison

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod order;
pub mod pricing;
pub mod security;
pub mod types;

pub use catalog::{Catalog, Offering};
pub use order::{Customer, Order, PaymentMethod};
pub use pricing::{CartTotals, DEFAULT_TAX_RATE, PricingCalculator, PricingError};
pub use types::*;
