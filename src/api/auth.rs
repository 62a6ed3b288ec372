//! Session identifiers and token storage.
//!
//! JIRA's session endpoint is backed by Basic Auth, so the session identifier
//! is `base64(username:password)`. Issued tokens can be kept in the OS keyring
//! per profile so later calls pick them up as the default token.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use super::error::{ApiError, Result};
use super::types::Credential;

/// The keyring service name for jira-connector tokens.
const KEYRING_SERVICE: &str = "jira-connector";

/// Build the session identifier for a credential pair.
///
/// Encodes "username:password" in Base64. The result is the value that goes
/// after "Basic " in the `Authorization` header.
pub fn session_identifier(credential: &Credential) -> String {
    let raw = format!("{}:{}", credential.username, credential.password);
    BASE64.encode(raw.as_bytes())
}

/// Build the complete `Authorization` header value for a session identifier.
pub fn basic_header(session_id: &str) -> String {
    format!("Basic {}", session_id)
}

/// Store a signed token in the OS keyring.
///
/// # Errors
///
/// Returns an error if the token cannot be stored in the keyring.
pub fn store_token(profile_name: &str, token: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| ApiError::Keyring(format!("failed to create keyring entry: {}", e)))?;

    entry
        .set_password(token)
        .map_err(|e| ApiError::Keyring(format!("failed to store token: {}", e)))
}

/// Retrieve the signed token stored for a profile.
///
/// Returns `None` when nothing is stored or the keyring is unavailable.
pub fn get_token(profile_name: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .and_then(|entry| entry.get_password())
        .ok()
}

/// Delete the signed token stored for a profile.
///
/// # Errors
///
/// Returns an error if the token cannot be deleted from the keyring.
pub fn delete_token(profile_name: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, profile_name)
        .map_err(|e| ApiError::Keyring(format!("failed to access keyring: {}", e)))?;

    entry
        .delete_password()
        .map_err(|e| ApiError::Keyring(format!("failed to delete token: {}", e)))
}
