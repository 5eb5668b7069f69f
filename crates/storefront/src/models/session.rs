//! Session-related types.

/// Session keys.
pub mod keys {
    /// Key for the cart id bound to this session.
    pub const CART_ID: &str = "cart_id";
}
