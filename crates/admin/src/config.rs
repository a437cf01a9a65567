//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_PASSWORD_HASH` - Argon2 PHC string for the operator password
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_BASE_URL` - Public URL (default: `http://localhost:3001`)
//! - `ADMIN_STATIC_DIR` - Static asset directory (default: crates/admin/static)
//! - `ADMIN_USERNAME` - Operator username (default: admin)
//! - `ADMIN_ENFORCE_STATUS_TRANSITIONS` - Reject order status changes missing
//!   from the workflow table (default: false)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use argon2::password_hash::PasswordHash;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const DEFAULT_USERNAME: &str = "admin";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin panel
    pub base_url: String,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Operator credentials
    pub operator: OperatorConfig,
    /// Reject order status changes the workflow table does not list
    pub enforce_status_transitions: bool,
    /// Emit JSON logs instead of text
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// The single back-office operator.
///
/// Implements `Debug` manually to redact the password hash.
#[derive(Clone)]
pub struct OperatorConfig {
    pub username: String,
    /// Argon2 PHC string
    pub password_hash: SecretString,
}

impl std::fmt::Debug for OperatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorConfig")
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `ADMIN_PASSWORD_HASH` is missing or is not a
    /// PHC string, or if any other variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let password_hash = get_required_env("ADMIN_PASSWORD_HASH")?;
        validate_password_hash("ADMIN_PASSWORD_HASH", &password_hash)?;

        Ok(Self {
            host: parse_env("ADMIN_HOST", "127.0.0.1")?,
            port: parse_env("ADMIN_PORT", "3001")?,
            base_url: get_env_or_default("ADMIN_BASE_URL", "http://localhost:3001"),
            static_dir: PathBuf::from(get_env_or_default(
                "ADMIN_STATIC_DIR",
                "crates/admin/static",
            )),
            operator: OperatorConfig {
                username: get_env_or_default("ADMIN_USERNAME", DEFAULT_USERNAME),
                password_hash: SecretString::from(password_hash),
            },
            enforce_status_transitions: parse_env("ADMIN_ENFORCE_STATUS_TRANSITIONS", "false")?,
            log_json: get_optional_env("LOG_FORMAT")
                .is_some_and(|v| v.eq_ignore_ascii_case("json")),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for local development and tests.
    #[must_use]
    pub fn local(port: u16, password_hash: &str) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port,
            base_url: format!("http://localhost:{port}"),
            static_dir: PathBuf::from("crates/admin/static"),
            operator: OperatorConfig {
                username: DEFAULT_USERNAME.to_string(),
                password_hash: SecretString::from(password_hash),
            },
            enforce_status_transitions: false,
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl OperatorConfig {
    /// The stored hash, for verification.
    #[must_use]
    pub fn password_hash(&self) -> &str {
        self.password_hash.expose_secret()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn validate_password_hash(key: &str, value: &str) -> Result<(), ConfigError> {
    PasswordHash::new(value)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), format!("not a PHC string: {e}")))
}

/// Get an optional, non-empty environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    get_optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    fn sample_hash() -> String {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(b"correct horse", &salt)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_local_defaults() {
        let config = AdminConfig::local(3001, &sample_hash());
        assert_eq!(config.socket_addr().port(), 3001);
        assert_eq!(config.operator.username, "admin");
        assert!(!config.enforce_status_transitions);
        assert!(!config.is_secure());
    }

    #[test]
    fn test_password_hash_must_be_phc() {
        assert!(validate_password_hash("ADMIN_PASSWORD_HASH", &sample_hash()).is_ok());
        let err = validate_password_hash("ADMIN_PASSWORD_HASH", "hunter2").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "ADMIN_PASSWORD_HASH"));
    }

    #[test]
    fn test_required_env_reports_key() {
        let err = get_required_env("BOUTIQUE_TEST_UNSET_HASH").unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "BOUTIQUE_TEST_UNSET_HASH"));
    }

    #[test]
    fn test_operator_debug_redacts_hash() {
        let config = AdminConfig::local(3001, &sample_hash());
        let debug_output = format!("{:?}", config.operator);
        assert!(debug_output.contains("admin"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("argon2id"));
    }
}
