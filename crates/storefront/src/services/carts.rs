//! Session-scoped carts.
//!
//! Every browser session is bound to a [`CartId`]. The cart for an id lives
//! in its own directory, `<carts dir>/<id>/cart.json`, and is hydrated on
//! first use into a bounded in-memory cache. Evicted carts are simply
//! hydrated again from disk on their next request.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use brightwire_core::CartId;
use brightwire_core::cart::CartStore;
use moka::future::Cache;
use thiserror::Error;

use crate::storage::FileStorage;

/// How long an untouched cart stays hydrated.
const IDLE_EVICTION: Duration = Duration::from_secs(60 * 60);

/// A cart persisted to the filesystem.
pub type SessionCart = CartStore<FileStorage>;

/// Errors reaching a session cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// The blocking task running the cart operation failed.
    #[error("cart task failed: {0}")]
    Task(String),
}

/// Hydrated carts keyed by cart id.
#[derive(Clone)]
pub struct CartRegistry {
    inner: Arc<CartRegistryInner>,
}

struct CartRegistryInner {
    root: PathBuf,
    carts: Cache<CartId, Arc<Mutex<SessionCart>>>,
}

impl CartRegistry {
    /// Registry persisting under `root`, keeping at most `capacity` carts in memory.
    pub fn new(root: impl Into<PathBuf>, capacity: u64) -> Self {
        let carts = Cache::builder()
            .max_capacity(capacity)
            .time_to_idle(IDLE_EVICTION)
            .build();

        Self {
            inner: Arc::new(CartRegistryInner {
                root: root.into(),
                carts,
            }),
        }
    }

    /// Run `f` against the cart for `id`, hydrating it first if needed.
    ///
    /// Cart operations do synchronous file I/O, so `f` runs on the blocking
    /// pool while holding the cart's lock.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Task`] if the blocking task panics or is cancelled.
    pub async fn with_cart<F, R>(&self, id: CartId, f: F) -> Result<R, CartError>
    where
        F: FnOnce(&mut SessionCart) -> R + Send + 'static,
        R: Send + 'static,
    {
        let cart = self.hydrate(id).await?;
        tokio::task::spawn_blocking(move || {
            let mut cart = cart.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut cart)
        })
        .await
        .map_err(|e| CartError::Task(e.to_string()))
    }

    /// Number of carts currently hydrated.
    #[must_use]
    pub fn hydrated(&self) -> u64 {
        self.inner.carts.entry_count()
    }

    async fn hydrate(&self, id: CartId) -> Result<Arc<Mutex<SessionCart>>, CartError> {
        let storage = FileStorage::new(self.inner.root.join(id.to_string()));
        self.inner
            .carts
            .try_get_with(id, async move {
                tokio::task::spawn_blocking(move || {
                    let cart = CartStore::open(storage);
                    tracing::debug!(cart_id = %id, lines = cart.len(), "hydrated cart");
                    Arc::new(Mutex::new(cart))
                })
                .await
            })
            .await
            .map_err(|e| CartError::Task(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use brightwire_core::cart::CartProduct;
    use brightwire_core::{ProductId, ProductType};
    use tempfile::tempdir;

    use super::*;

    fn audit() -> CartProduct {
        CartProduct::new(ProductId::new(1), ProductType::Service, "Website Audit", "$300")
    }

    #[tokio::test]
    async fn test_carts_are_isolated_per_id() {
        let dir = tempdir().unwrap();
        let registry = CartRegistry::new(dir.path(), 100);
        let (alice, bob) = (CartId::generate(), CartId::generate());

        registry.with_cart(alice, |cart| cart.add(audit())).await.unwrap();
        registry.with_cart(alice, |cart| cart.add(audit())).await.unwrap();

        assert_eq!(registry.with_cart(alice, |cart| cart.count()).await.unwrap(), 2);
        assert_eq!(registry.with_cart(bob, |cart| cart.count()).await.unwrap(), 0);
        assert!(dir.path().join(alice.to_string()).join("cart.json").exists());
        assert!(!dir.path().join(bob.to_string()).exists());
    }

    #[tokio::test]
    async fn test_cart_rehydrates_from_disk() {
        let dir = tempdir().unwrap();
        let id = CartId::generate();

        CartRegistry::new(dir.path(), 100)
            .with_cart(id, |cart| cart.add(audit()))
            .await
            .unwrap();

        let fresh = CartRegistry::new(dir.path(), 100);
        let count = fresh.with_cart(id, |cart| cart.count()).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_clear_removes_cart_directory() {
        let dir = tempdir().unwrap();
        let registry = CartRegistry::new(dir.path(), 100);
        let id = CartId::generate();
        let cart_dir = dir.path().join(id.to_string());

        registry.with_cart(id, |cart| cart.add(audit())).await.unwrap();
        assert!(cart_dir.exists());

        registry.with_cart(id, SessionCart::clear).await.unwrap();
        assert!(!cart_dir.exists());

        // The cached cart writes its directory again on the next add.
        registry.with_cart(id, |cart| cart.add(audit())).await.unwrap();
        assert!(cart_dir.join("cart.json").exists());
    }
}
