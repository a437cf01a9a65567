//! Customer accounts.
//!
//! Sign-in and registration go to the CMS when one is configured. Without a
//! CMS, accounts live in memory with Argon2id password hashes and a demo
//! account is available out of the box.

use std::collections::HashMap;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::ExposeSecret;
use thiserror::Error;
use tokio::sync::RwLock;

use boutique_core::{Email, EmailError};

use crate::cms::{CmsClient, CmsError, CmsSession};
use crate::models::CurrentCustomer;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Demo account available when no CMS is configured.
pub const DEMO_EMAIL: &str = "demo@boutique.test";
pub const DEMO_PASSWORD: &str = "boutique-demo";

/// Errors from sign-in and registration.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("an account with this email already exists")]
    AlreadyRegistered,

    #[error("{0}")]
    WeakPassword(String),

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("username must be between 3 and 40 characters")]
    InvalidUsername,

    /// The CMS refused the request with a message meant for the customer.
    #[error("{0}")]
    Rejected(String),

    #[error("CMS error: {0}")]
    Cms(CmsError),

    #[error("password hashing failed")]
    PasswordHash,
}

impl AuthError {
    /// Whether the failure is the customer's to fix rather than ours.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        !matches!(self, Self::Cms(_) | Self::PasswordHash)
    }
}

/// Account backend.
pub enum AccountService {
    Cms(CmsClient),
    Local(LocalAccounts),
}

impl AccountService {
    /// Sign in with an email (or CMS username) and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for unknown accounts or wrong
    /// passwords, or the backend's failure.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<CurrentCustomer, AuthError> {
        let identifier = identifier.trim();
        if identifier.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        match self {
            Self::Cms(client) => client
                .login(identifier, password)
                .await
                .map(customer_from_cms)
                .map_err(into_auth_error),
            Self::Local(accounts) => accounts.login(identifier, password).await,
        }
    }

    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `AuthError::AlreadyRegistered`, or the
    /// backend's failure.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<CurrentCustomer, AuthError> {
        let username = username.trim();
        if !(3..=40).contains(&username.chars().count()) {
            return Err(AuthError::InvalidUsername);
        }
        let email = Email::parse(email)?;
        validate_password(password)?;

        match self {
            Self::Cms(client) => client
                .register(username, email.as_str(), password)
                .await
                .map(customer_from_cms)
                .map_err(into_auth_error),
            Self::Local(accounts) => accounts.register(username, email, password).await,
        }
    }
}

fn customer_from_cms(session: CmsSession) -> CurrentCustomer {
    CurrentCustomer {
        id: session.user.id,
        username: session.user.username,
        email: session.user.email,
        token: Some(session.jwt.expose_secret().to_string()),
    }
}

fn into_auth_error(error: CmsError) -> AuthError {
    if !error.is_rejection() {
        return AuthError::Cms(error);
    }
    match error {
        CmsError::Status { message, .. } => AuthError::Rejected(message),
        other => AuthError::Cms(other),
    }
}

struct LocalAccount {
    id: i32,
    username: String,
    email: Email,
    password_hash: String,
}

/// In-memory accounts keyed by lowercased email.
pub struct LocalAccounts {
    accounts: RwLock<HashMap<String, LocalAccount>>,
    /// Verified against when the email is unknown, so a miss costs the same
    /// as a wrong password.
    dummy_hash: String,
}

impl LocalAccounts {
    /// Accounts seeded with the demo customer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if the demo password cannot be hashed.
    pub fn with_demo_account() -> Result<Self, AuthError> {
        let email = Email::parse(DEMO_EMAIL)?;
        let account = LocalAccount {
            id: 1,
            username: "Demo Customer".to_string(),
            password_hash: hash_password(DEMO_PASSWORD)?,
            email,
        };
        let mut accounts = HashMap::new();
        accounts.insert(account.email.as_str().to_lowercase(), account);
        Ok(Self {
            accounts: RwLock::new(accounts),
            dummy_hash: hash_password(&uuid::Uuid::new_v4().to_string())?,
        })
    }

    async fn login(&self, identifier: &str, password: &str) -> Result<CurrentCustomer, AuthError> {
        let accounts = self.accounts.read().await;
        let Some(account) = accounts.get(&identifier.to_lowercase()) else {
            let _ = verify_password(password, &self.dummy_hash);
            return Err(AuthError::InvalidCredentials);
        };
        verify_password(password, &account.password_hash)?;
        Ok(account.to_customer())
    }

    async fn register(
        &self,
        username: &str,
        email: Email,
        password: &str,
    ) -> Result<CurrentCustomer, AuthError> {
        let key = email.as_str().to_lowercase();
        if self.accounts.read().await.contains_key(&key) {
            return Err(AuthError::AlreadyRegistered);
        }
        let password_hash = hash_password(password)?;

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&key) {
            return Err(AuthError::AlreadyRegistered);
        }
        let id = accounts.values().map(|a| a.id).max().unwrap_or(0) + 1;
        let account = LocalAccount {
            id,
            username: username.to_string(),
            email,
            password_hash,
        };
        let customer = account.to_customer();
        accounts.insert(key, account);
        tracing::info!(customer_id = id, "Registered local account");
        Ok(customer)
    }
}

impl LocalAccount {
    fn to_customer(&self) -> CurrentCustomer {
        CurrentCustomer {
            id: self.id,
            username: self.username.clone(),
            email: self.email.to_string(),
            token: None,
        }
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn local() -> AccountService {
        AccountService::Local(LocalAccounts::with_demo_account().unwrap())
    }

    #[tokio::test]
    async fn test_demo_login() {
        let customer = local().login("Demo@Boutique.test", DEMO_PASSWORD).await.unwrap();
        assert_eq!(customer.email, DEMO_EMAIL);
        assert!(customer.token.is_none());
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let err = local().login(DEMO_EMAIL, "wrong-password").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(err.is_user_error());
    }

    #[tokio::test]
    async fn test_unknown_email_still_runs_a_verification() {
        let accounts = LocalAccounts::with_demo_account().unwrap();
        assert!(PasswordHash::new(&accounts.dummy_hash).is_ok());
        assert!(verify_password(DEMO_PASSWORD, &accounts.dummy_hash).is_err());

        let err = accounts
            .login("nobody@boutique.test", DEMO_PASSWORD)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let accounts = local();
        let created = accounts
            .register("Grace", "grace@boutique.test", "hopper-1906")
            .await
            .unwrap();
        assert_eq!(created.id, 2);

        let signed_in = accounts.login("grace@boutique.test", "hopper-1906").await.unwrap();
        assert_eq!(signed_in.username, "Grace");
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_weak_passwords() {
        let accounts = local();
        let duplicate = accounts
            .register("Demo", DEMO_EMAIL, "long-enough-pw")
            .await
            .unwrap_err();
        assert!(matches!(duplicate, AuthError::AlreadyRegistered));

        let weak = accounts
            .register("Grace", "grace@boutique.test", "short")
            .await
            .unwrap_err();
        assert!(matches!(weak, AuthError::WeakPassword(_)));

        let bad_email = accounts
            .register("Grace", "grace-at-boutique", "long-enough-pw")
            .await
            .unwrap_err();
        assert!(matches!(bad_email, AuthError::InvalidEmail(_)));
    }

    #[test]
    fn test_cms_rejection_maps_to_message() {
        let err = into_auth_error(CmsError::Status {
            status: 400,
            message: "Email or Username are already taken".to_string(),
        });
        assert!(matches!(err, AuthError::Rejected(ref m) if m.contains("already taken")));

        let err = into_auth_error(CmsError::Status {
            status: 502,
            message: "Bad gateway".to_string(),
        });
        assert!(!err.is_user_error());
    }
}
