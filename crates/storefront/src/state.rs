//! Application state shared across handlers.

use std::sync::Arc;

use brightwire_core::{Catalog, PricingCalculator};

use crate::config::StorefrontConfig;
use crate::services::{CartRegistry, EmailService, OrderBook, VerificationStore};

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("invalid built-in catalog: {0}")]
    Catalog(#[from] serde_json::Error),
    #[error("invalid SMTP configuration: {0}")]
    Email(#[from] lettre::transport::smtp::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the catalog, carts, orders and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    carts: CartRegistry,
    orders: OrderBook,
    verification: VerificationStore,
    email: Option<EmailService>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in catalog does not parse or the SMTP
    /// relay cannot be configured.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let catalog = Catalog::builtin()?;
        let carts = CartRegistry::new(config.carts_dir(), config.cart_cache_capacity);
        let verification = VerificationStore::with_ttl_minutes(config.verification_ttl_minutes);
        let email = config.email.as_ref().map(EmailService::new).transpose()?;

        if email.is_none() {
            tracing::warn!("SMTP not configured, verification codes and receipts will not be emailed");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                carts,
                orders: OrderBook::default(),
                verification,
                email,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get the pricing calculator.
    #[must_use]
    pub fn pricing(&self) -> &PricingCalculator {
        &self.inner.config.pricing
    }

    /// Get a reference to the session carts.
    #[must_use]
    pub fn carts(&self) -> &CartRegistry {
        &self.inner.carts
    }

    /// Get a reference to the placed orders.
    #[must_use]
    pub fn orders(&self) -> &OrderBook {
        &self.inner.orders
    }

    /// Get a reference to the verification tokens.
    #[must_use]
    pub fn verification(&self) -> &VerificationStore {
        &self.inner.verification
    }

    /// Get the email service, if SMTP is configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }
}
