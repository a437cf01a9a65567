//! Shared page chrome for signed-in pages.
//!
//! The sidebar shows the operator, highlights the current section and
//! renders any queued notice. `AdminLayout` gathers those in one extractor
//! and, like [`RequireAdminAuth`], redirects to the login page when nobody
//! is signed in.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::models::CurrentAdmin;
use crate::services::flash;

use super::auth::{AdminAuthRejection, RequireAdminAuth};

/// Admin user view for templates.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub username: String,
    pub initial: String,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            username: admin.username.clone(),
            initial: admin
                .username
                .chars()
                .next()
                .map(|c| c.to_uppercase().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Per-request layout data.
#[derive(Debug, Clone)]
pub struct AdminLayout {
    pub admin: CurrentAdmin,
    pub admin_user: AdminUserView,
    /// First path segment, e.g. `/orders` for `/orders/4`.
    pub current_path: String,
    /// One-shot notice, consumed by this render.
    pub flash: Option<String>,
}

impl AdminLayout {
    /// Whether the sidebar link for `section` is active.
    #[must_use]
    pub fn is_active(&self, section: &str) -> bool {
        self.current_path == section
    }
}

/// Section a request path belongs to.
fn section(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .next()
        .filter(|s| !s.is_empty())
        .map_or_else(|| "/".to_string(), |s| format!("/{s}"))
}

impl<S> FromRequestParts<S> for AdminLayout
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAdminAuth(admin) = RequireAdminAuth::from_request_parts(parts, state).await?;
        let flash = match parts.extensions.get::<Session>() {
            Some(session) => flash::take(session).await,
            None => None,
        };

        Ok(Self {
            admin_user: AdminUserView::from(&admin),
            admin,
            current_path: section(parts.uri.path()),
            flash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_uses_first_segment() {
        assert_eq!(section("/"), "/");
        assert_eq!(section("/orders"), "/orders");
        assert_eq!(section("/orders/4/status"), "/orders");
        assert_eq!(section("/news/new"), "/news");
    }

    #[test]
    fn test_admin_user_view_initial() {
        let admin = CurrentAdmin {
            username: "operator".to_string(),
            signed_in_at: chrono::Utc::now(),
        };
        let view = AdminUserView::from(&admin);
        assert_eq!(view.initial, "O");
        assert_eq!(view.username, "operator");
    }
}
