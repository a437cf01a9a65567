//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Operator sign-in against the configured Argon2 hash
//! - `flash` - One-shot notices across redirects

pub mod auth;
pub mod flash;

pub use auth::{AdminAuthError, AdminAuthService};
