//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::cms::{CmsClient, CmsError};
use crate::config::StorefrontConfig;
use crate::services::{AccountService, AuthError, LocalAccounts};

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("CMS client: {0}")]
    Cms(#[from] CmsError),
    #[error("local accounts: {0}")]
    Accounts(#[from] AuthError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    accounts: AccountService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// With a CMS configured, both the catalog and customer accounts go
    /// through it. Without one, the demo catalog and in-memory accounts are
    /// used.
    ///
    /// # Errors
    ///
    /// Returns an error if the CMS client cannot be built or the demo
    /// account cannot be seeded.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let (catalog, accounts) = match &config.cms {
            Some(cms) => {
                let client = CmsClient::new(cms)?;
                (Catalog::Cms(client.clone()), AccountService::Cms(client))
            }
            None => (
                Catalog::demo(),
                AccountService::Local(LocalAccounts::with_demo_account()?),
            ),
        };

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                accounts,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the customer account backend.
    #[must_use]
    pub fn accounts(&self) -> &AccountService {
        &self.inner.accounts
    }
}
