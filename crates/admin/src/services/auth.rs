//! Operator authentication service.
//!
//! The back-office has a single operator whose credentials come from the
//! environment: a username and an Argon2 PHC hash of the password.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::OperatorConfig;
use crate::models::CurrentAdmin;

/// Errors that can occur during operator sign-in.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Unknown username or wrong password.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The configured hash could not be parsed.
    #[error("operator password hash is malformed")]
    MalformedHash,
}

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    operator: &'a OperatorConfig,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(operator: &'a OperatorConfig) -> Self {
        Self { operator }
    }

    /// Check a username and password against the configured operator.
    ///
    /// The password is verified even when the username is wrong, so both
    /// failures take the same time.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` on a mismatch, or
    /// `AdminAuthError::MalformedHash` if the configured hash is unusable.
    pub fn login(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<CurrentAdmin, AdminAuthError> {
        let hash = PasswordHash::new(self.operator.password_hash())
            .map_err(|_| AdminAuthError::MalformedHash)?;
        let password_ok = Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok();
        let username_ok = username.trim() == self.operator.username;

        if password_ok && username_ok {
            Ok(CurrentAdmin {
                username: self.operator.username.clone(),
                signed_in_at: now,
            })
        } else {
            Err(AdminAuthError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};
    use secrecy::SecretString;

    fn operator(password: &str) -> OperatorConfig {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string();
        OperatorConfig {
            username: "admin".to_string(),
            password_hash: SecretString::from(hash),
        }
    }

    #[test]
    fn test_login_accepts_configured_credentials() {
        let operator = operator("s3cret-pass");
        let admin = AdminAuthService::new(&operator)
            .login(" admin ", "s3cret-pass", Utc::now())
            .unwrap();
        assert_eq!(admin.username, "admin");
    }

    #[test]
    fn test_login_rejects_wrong_password_or_username() {
        let operator = operator("s3cret-pass");
        let service = AdminAuthService::new(&operator);
        assert!(matches!(
            service.login("admin", "nope", Utc::now()),
            Err(AdminAuthError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login("root", "s3cret-pass", Utc::now()),
            Err(AdminAuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_login_reports_malformed_hash() {
        let operator = OperatorConfig {
            username: "admin".to_string(),
            password_hash: SecretString::from("plaintext"),
        };
        assert!(matches!(
            AdminAuthService::new(&operator).login("admin", "plaintext", Utc::now()),
            Err(AdminAuthError::MalformedHash)
        ));
    }
}
