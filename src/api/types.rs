//! JIRA connector request and response types.
//!
//! These types model the login exchange and the uniform error shape that every
//! failed call is reduced to.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Login credentials supplied by the caller.
///
/// Only lives for the duration of a login call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// The JIRA user name.
    pub username: String,
    /// The user's password.
    pub password: String,
}

impl Credential {
    /// Create a new credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The session object handed back to the caller after a successful login.
///
/// Carries whatever the server reported plus the signed `jwt`. Has no field
/// for the transport session identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The signed token to present on later calls.
    pub jwt: String,
    /// Server-reported session fields (e.g. `name`, `value`).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// The result of `POST /rest/auth/1/session`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResult {
    /// The augmented session descriptor.
    pub session: Session,
    /// Any other top-level fields, such as `loginInfo`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LoginResult {
    /// The signed token issued for this session.
    pub fn token(&self) -> &str {
        &self.session.jwt
    }
}

/// The message part of a [`NormalizedError`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    /// A plain message produced locally.
    Text(String),
    /// The server's `errorMessages` list.
    List(Vec<String>),
    /// The server's `errors` map (field name to message).
    Map(Map<String, Value>),
}

impl ErrorMessage {
    /// Extract the message from a JIRA error body.
    ///
    /// A non-empty `errorMessages` list wins over the `errors` map. A body
    /// carrying neither yields an empty map.
    pub fn from_body(body: &Value) -> Self {
        if let Some(messages) = body.get("errorMessages").and_then(Value::as_array) {
            if !messages.is_empty() {
                return ErrorMessage::List(
                    messages
                        .iter()
                        .map(|m| match m {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect(),
                );
            }
        }

        match body.get("errors").and_then(Value::as_object) {
            Some(errors) => ErrorMessage::Map(errors.clone()),
            None => ErrorMessage::Map(Map::new()),
        }
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorMessage::Text(text) => write!(f, "{}", text),
            ErrorMessage::List(messages) => write!(f, "{}", messages.join(", ")),
            ErrorMessage::Map(errors) => {
                let parts: Vec<String> = errors
                    .iter()
                    .map(|(k, v)| match v {
                        Value::String(s) => format!("{}: {}", k, s),
                        other => format!("{}: {}", k, other),
                    })
                    .collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

/// The single error shape delivered to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedError {
    /// The HTTP status, or `0` when no response was received.
    pub status_code: u16,
    /// What went wrong.
    pub message: ErrorMessage,
}

impl NormalizedError {
    /// Create an error with a plain text message.
    pub fn text(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: ErrorMessage::Text(message.into()),
        }
    }

    /// Build the error for a non-2xx response body.
    pub fn from_response(status_code: u16, body: &Value) -> Self {
        Self {
            status_code,
            message: ErrorMessage::from_body(body),
        }
    }
}

impl fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status_code, self.message)
    }
}
