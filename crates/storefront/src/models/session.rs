//! Session-related types.
//!
//! Types stored in the session for authentication and cart state.

use serde::{Deserialize, Serialize};

/// Session-stored customer identity.
///
/// Minimal data stored in the session to identify the signed-in customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentCustomer {
    /// Account ID at the account backend.
    pub id: i32,
    /// Display name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// CMS API token, when signed in through the CMS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Session keys.
pub mod keys {
    /// Key for the persisted cart (items plus selection).
    pub const CART: &str = boutique_core::CART_STORAGE_KEY;

    /// Key for storing the current signed-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Key for the summary of the most recently placed order.
    pub const LAST_ORDER: &str = "last_order";

    /// Key for a one-shot notice shown on the next page render.
    pub const FLASH: &str = "flash";
}
