//! Cart persistence in the visitor session.
//!
//! The cart lives under the `cart-storage` session key as
//! `{ "items": [..], "selectedIds": [..] }`. A missing or unreadable entry
//! loads as an empty cart.

use tower_sessions::Session;
use tracing::warn;

use boutique_core::CartState;

use crate::models::session_keys;

/// Load the session cart, treating unreadable state as empty.
pub async fn load(session: &Session) -> CartState {
    match session.get::<CartState>(session_keys::CART).await {
        Ok(cart) => cart.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "Discarding unreadable cart state");
            CartState::default()
        }
    }
}

/// Persist the cart.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn save(
    session: &Session,
    cart: &CartState,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}
