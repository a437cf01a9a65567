//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AdminConfig;
use crate::store::AdminStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    store: AdminStore,
}

impl AppState {
    /// Create a new application state around an existing store.
    #[must_use]
    pub fn new(config: AdminConfig, store: AdminStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// State backed by the demo data set.
    #[must_use]
    pub fn demo(config: AdminConfig) -> Self {
        Self::new(config, AdminStore::demo())
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the back-office store.
    #[must_use]
    pub fn store(&self) -> &AdminStore {
        &self.inner.store
    }
}
