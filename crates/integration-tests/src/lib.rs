//! End-to-end test harness for Boutique.
//!
//! Each test spawns a real server on an ephemeral port with demo data and
//! drives it over HTTP with a cookie-keeping client, so sessions, redirects
//! and middleware behave exactly as in production.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p boutique-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_cart` - Cart, selection and checkout flows
//! - `storefront_auth` - Customer sign-in and health checks
//! - `storefront_cms` - Catalog and accounts served by a stub CMS
//! - `admin_panel` - Operator sign-in, orders, vouchers and products

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cms_stub;

use std::time::Duration;

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use axum::Router;
use reqwest::{Client, Response};
use secrecy::SecretString;
use tokio::net::TcpListener;
use url::Url;

use boutique_admin::config::AdminConfig;
use boutique_storefront::config::{CmsConfig, StorefrontConfig};

use cms_stub::CMS_API_TOKEN;

/// Operator username configured by [`AdminConfig::local`].
pub const OPERATOR_USERNAME: &str = "admin";

/// Password the test operator signs in with.
pub const OPERATOR_PASSWORD: &str = "correct horse battery staple";

/// Error starting a test server.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
    #[error("storefront state: {0}")]
    Storefront(#[from] boutique_storefront::state::StateError),
    #[error("password hash: {0}")]
    Hash(String),
    #[error("CMS url: {0}")]
    Url(#[from] url::ParseError),
}

/// A running server and a client that keeps its cookies.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
}

impl TestServer {
    async fn start(router: Router) -> Result<Self, HarnessError> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        // Serves until the test runtime shuts down
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            base_url: format!("http://{addr}"),
            client,
        })
    }

    /// Absolute URL for a path on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET a path, following redirects.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the request fails.
    pub async fn get(&self, path: &str) -> Result<Response, reqwest::Error> {
        self.client.get(self.url(path)).send().await
    }

    /// POST a URL-encoded form, following redirects.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the request fails.
    pub async fn post_form(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<Response, reqwest::Error> {
        self.client.post(self.url(path)).form(form).send().await
    }
}

/// Start a storefront with the demo catalog and demo account.
///
/// # Errors
///
/// Returns an error if the state cannot be built or the port cannot be bound.
pub async fn spawn_storefront() -> Result<TestServer, HarnessError> {
    let state = boutique_storefront::state::AppState::new(StorefrontConfig::local(0))?;
    TestServer::start(boutique_storefront::app(state)).await
}

/// Start a storefront whose catalog and accounts come from the CMS at
/// `cms_url`, authenticating with [`CMS_API_TOKEN`].
///
/// # Errors
///
/// Returns an error if the URL is invalid, the state cannot be built or the
/// port cannot be bound.
pub async fn spawn_cms_storefront(cms_url: &str) -> Result<TestServer, HarnessError> {
    let mut config = StorefrontConfig::local(0);
    config.cms = Some(CmsConfig {
        base_url: Url::parse(cms_url)?,
        api_token: Some(SecretString::from(CMS_API_TOKEN)),
        cache_ttl: Duration::from_secs(60),
    });
    let state = boutique_storefront::state::AppState::new(config)?;
    TestServer::start(boutique_storefront::app(state)).await
}

/// Admin configuration whose operator signs in with [`OPERATOR_PASSWORD`].
///
/// # Errors
///
/// Returns [`HarnessError::Hash`] if hashing fails.
pub fn admin_config() -> Result<AdminConfig, HarnessError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(OPERATOR_PASSWORD.as_bytes(), &salt)
        .map_err(|e| HarnessError::Hash(e.to_string()))?
        .to_string();
    Ok(AdminConfig::local(0, &hash))
}

/// Start an admin panel with demo data.
///
/// # Errors
///
/// Returns an error if the port cannot be bound.
pub async fn spawn_admin(config: AdminConfig) -> Result<TestServer, HarnessError> {
    let state = boutique_admin::state::AppState::demo(config);
    TestServer::start(boutique_admin::app(state)).await
}

/// Start an admin panel and sign the client in as the operator.
///
/// # Errors
///
/// Returns an error if the server cannot start or sign-in fails.
pub async fn signed_in_admin(config: AdminConfig) -> Result<TestServer, HarnessError> {
    let server = spawn_admin(config).await?;
    server
        .post_form(
            "/login",
            &[("username", OPERATOR_USERNAME), ("password", OPERATOR_PASSWORD)],
        )
        .await?
        .error_for_status()?;
    Ok(server)
}
