//! Session-related types for admin authentication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session-stored operator identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub username: String,
    pub signed_in_at: DateTime<Utc>,
}

/// Session keys for admin data.
pub mod keys {
    /// Key for storing the signed-in operator.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for the one-shot notice shown on the next page.
    pub const FLASH: &str = "flash";
}
