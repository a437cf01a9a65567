//! Authentication route handlers.
//!
//! The operator signs in with the configured username and password. A
//! failed attempt re-renders the form with 401 and keeps the username.

use askama::Template;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::render;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_admin, current_admin, set_current_admin};
use crate::services::{AdminAuthError, AdminAuthService, flash};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub username: String,
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Display login page. Already signed-in operators go to the dashboard.
pub async fn login_page(session: Session) -> Result<Response> {
    if current_admin(&session).await.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    let template = LoginTemplate {
        username: String::new(),
        error: None,
        notice: flash::take(&session).await,
    };
    Ok(render(&template)?.into_response())
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let service = AdminAuthService::new(&state.config().operator);
    match service.login(&form.username, &form.password, Utc::now()) {
        Ok(admin) => {
            set_current_admin(&session, &admin).await?;
            set_sentry_user(&admin.username);
            tracing::info!("Operator signed in");
            Ok(Redirect::to("/").into_response())
        }
        Err(AdminAuthError::InvalidCredentials) => {
            tracing::warn!("Operator sign-in failed");
            let template = LoginTemplate {
                username: form.username,
                error: Some("Invalid username or password".to_string()),
                notice: None,
            };
            Ok((StatusCode::UNAUTHORIZED, render(&template)?).into_response())
        }
        Err(e @ AdminAuthError::MalformedHash) => Err(AppError::Internal(e.to_string())),
    }
}

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    flash::set(&session, "You have been signed out").await?;
    Ok(Redirect::to("/login"))
}
