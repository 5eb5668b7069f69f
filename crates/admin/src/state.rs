//! Application state shared across handlers.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::catalog::CatalogEditor;
use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The catalog editor sits behind a `RwLock` so
/// searches run concurrently and edits are serialized.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    editor: RwLock<CatalogEditor>,
}

impl AppState {
    /// Create a new application state around an editor.
    #[must_use]
    pub fn new(config: AdminConfig, editor: CatalogEditor) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                editor: RwLock::new(editor),
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get the catalog editor lock.
    #[must_use]
    pub fn editor(&self) -> &RwLock<CatalogEditor> {
        &self.inner.editor
    }
}
