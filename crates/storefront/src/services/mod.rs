//! Session-backed services used by the route handlers.

pub mod accounts;
pub mod cart_store;
pub mod flash;

pub use accounts::{AccountService, AuthError, LocalAccounts};
