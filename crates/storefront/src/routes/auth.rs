//! Authentication route handlers.
//!
//! Customers sign in against the CMS users endpoint, or against the local
//! demo accounts when no CMS is configured. Failures re-render the form
//! with an inline message.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, capture_auth_failure, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{PageContext, clear_current_customer, set_current_customer};
use crate::services::{AuthError, flash};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: PageContext,
    pub identifier: String,
    pub error: Option<String>,
}

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: PageContext,
    pub username: String,
    pub email: String,
    pub error: Option<String>,
}

/// Shown when the CMS cannot serve a sign-in or registration.
const BACKEND_UNAVAILABLE: &str = "Sign-in is temporarily unavailable, please try again";

/// Message shown for a failed sign-in or registration, or `None` when the
/// failure is ours and should surface as a server error.
fn inline_message(error: &AuthError) -> Option<String> {
    match error {
        AuthError::InvalidCredentials => Some("Invalid email or password".to_string()),
        AuthError::AlreadyRegistered => {
            Some("An account with this email already exists".to_string())
        }
        AuthError::InvalidEmail(_) => Some("Please enter a valid email address".to_string()),
        AuthError::WeakPassword(message) | AuthError::Rejected(message) => Some(message.clone()),
        AuthError::InvalidUsername => Some(error.to_string()),
        AuthError::Cms(_) => Some(BACKEND_UNAVAILABLE.to_string()),
        AuthError::PasswordHash => None,
    }
}

/// Status for a re-rendered form. Backend outages are reported before the
/// form goes back to the customer.
fn failure_status(error: &AuthError, rejected: StatusCode) -> StatusCode {
    if error.is_user_error() {
        return rejected;
    }
    capture_auth_failure(error);
    StatusCode::SERVICE_UNAVAILABLE
}

// =============================================================================
// Handlers
// =============================================================================

/// Display login page.
pub async fn login_page(layout: PageContext) -> impl IntoResponse {
    LoginTemplate {
        layout,
        identifier: String::new(),
        error: None,
    }
}

/// Handle login form submission.
#[instrument(skip(state, layout, session, form))]
pub async fn login(
    State(state): State<AppState>,
    layout: PageContext,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match state.accounts().login(&form.identifier, &form.password).await {
        Ok(customer) => {
            set_current_customer(&session, &customer).await?;
            set_sentry_user(customer.id, &customer.email);
            tracing::info!(customer_id = customer.id, "Customer signed in");
            flash::set(&session, format!("Welcome back, {}", customer.username)).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            let Some(message) = inline_message(&e) else {
                return Err(AppError::Auth(e));
            };
            Ok((
                failure_status(&e, StatusCode::UNAUTHORIZED),
                LoginTemplate {
                    layout,
                    identifier: form.identifier,
                    error: Some(message),
                },
            )
                .into_response())
        }
    }
}

/// Display registration page.
pub async fn register_page(layout: PageContext) -> impl IntoResponse {
    RegisterTemplate {
        layout,
        username: String::new(),
        email: String::new(),
        error: None,
    }
}

/// Handle registration form submission.
#[instrument(skip(state, layout, session, form))]
pub async fn register(
    State(state): State<AppState>,
    layout: PageContext,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let result = if form.password == form.password_confirm {
        state
            .accounts()
            .register(&form.username, &form.email, &form.password)
            .await
    } else {
        Err(AuthError::WeakPassword("Passwords do not match".to_string()))
    };

    match result {
        Ok(customer) => {
            set_current_customer(&session, &customer).await?;
            set_sentry_user(customer.id, &customer.email);
            tracing::info!(customer_id = customer.id, "Customer registered");
            flash::set(&session, format!("Welcome, {}", customer.username)).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            let Some(message) = inline_message(&e) else {
                return Err(AppError::Auth(e));
            };
            Ok((
                failure_status(&e, StatusCode::UNPROCESSABLE_ENTITY),
                RegisterTemplate {
                    layout,
                    username: form.username,
                    email: form.email,
                    error: Some(message),
                },
            )
                .into_response())
        }
    }
}

/// Handle logout. The cart stays with the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_customer(&session).await?;
    clear_sentry_user();
    flash::set(&session, "You have been signed out").await?;
    Ok(Redirect::to("/"))
}
