//! API error types for the JIRA connector.

use thiserror::Error;

use super::transport::TransportError;
use super::types::NormalizedError;

/// Status code reported for failures where no HTTP response was received.
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

/// Message used when a call requiring authentication has no usable token.
pub const NO_TOKEN_MESSAGE: &str = "no token supplied";

/// Errors that can occur when interacting with the JIRA API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No token was supplied and no default token is configured.
    #[error("No token supplied")]
    NoToken,

    /// The token is expired, malformed or carries a bad signature.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The session identifier could not be protected or signed.
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// The protected session identifier could not be recovered.
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// JIRA answered with a status outside 2xx, or the call was refused
    /// locally before reaching the network.
    #[error("{0}")]
    Remote(NormalizedError),

    /// A `:name` placeholder in the path template had no value.
    #[error("Missing path parameter: {0}")]
    MissingPathParameter(String),

    /// The resource has no method with this name.
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// Invalid response from the API.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Keyring error when storing/retrieving tokens.
    #[error("Keyring error: {0}")]
    Keyring(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// The `401 no token supplied` refusal issued without a network call.
    pub fn unauthenticated() -> Self {
        ApiError::Remote(NormalizedError::text(401, NO_TOKEN_MESSAGE))
    }

    /// The status code of the normalized error surface.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NoToken | ApiError::InvalidToken(_) => 401,
            ApiError::Transport(_) => TRANSPORT_FAILURE_STATUS,
            ApiError::Remote(err) => err.status_code,
            ApiError::MissingPathParameter(_) | ApiError::UnknownMethod(_) => 400,
            ApiError::Encryption(_)
            | ApiError::Decryption(_)
            | ApiError::InvalidResponse(_)
            | ApiError::Keyring(_) => 500,
        }
    }

    /// Reduce this error to `{statusCode, message}`.
    pub fn normalized(&self) -> NormalizedError {
        match self {
            ApiError::Remote(err) => err.clone(),
            ApiError::NoToken => NormalizedError::text(401, NO_TOKEN_MESSAGE),
            other => NormalizedError::text(other.status_code(), other.to_string()),
        }
    }

    /// Whether the caller should treat this as an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        self.status_code() == 401
    }
}
