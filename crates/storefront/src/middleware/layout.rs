//! Shared page chrome.
//!
//! Every full-page template renders the header cart badge, the account
//! links and any queued notice. `PageContext` gathers those from the
//! session in one extractor.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::models::CurrentCustomer;
use crate::services::{cart_store, flash};

use super::auth::current_customer;

/// Per-request layout data.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub customer: Option<CurrentCustomer>,
    /// Total units in the cart, shown in the header badge.
    pub cart_count: u32,
    /// One-shot notice, consumed by this render.
    pub flash: Option<String>,
}

impl PageContext {
    /// Layout data for a session.
    pub async fn load(session: &Session) -> Self {
        Self {
            customer: current_customer(session).await,
            cart_count: cart_store::load(session).await.item_count(),
            flash: flash::take(session).await,
        }
    }

    #[must_use]
    pub const fn signed_in(&self) -> bool {
        self.customer.is_some()
    }
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Session>() {
            Some(session) => Ok(Self::load(session).await),
            None => Ok(Self::default()),
        }
    }
}
