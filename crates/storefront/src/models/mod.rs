//! Session-stored storefront models.

pub mod order;
pub mod session;

pub use order::{ContactDetails, PlacedLine, PlacedOrder};
pub use session::{CurrentCustomer, keys as session_keys};
