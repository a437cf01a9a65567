//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added in `main`)
//! 2. `TraceLayer` (request span)
//! 3. Request ID
//! 4. Security headers (stricter than the storefront)
//! 5. Session layer (tower-sessions, in-memory store, SameSite=Strict)
//!
//! Authentication is enforced per handler by the [`RequireAdminAuth`] and
//! [`AdminLayout`] extractors.

pub mod auth;
pub mod layout;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{RequireAdminAuth, clear_current_admin, current_admin, set_current_admin};
pub use layout::{AdminLayout, AdminUserView};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
