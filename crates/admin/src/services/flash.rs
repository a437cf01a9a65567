//! One-shot notices carried across a redirect.

use tower_sessions::Session;

use crate::models::session_keys;

/// Queue a notice for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn set(
    session: &Session,
    message: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::FLASH, message.into()).await
}

/// Take the queued notice, if any.
pub async fn take(session: &Session) -> Option<String> {
    session
        .remove::<String>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
}
