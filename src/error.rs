//! Centralized error types for the jira-connector command line.
//!
//! This module aggregates API and configuration errors and provides
//! user-friendly messages for them. All error types use `thiserror`.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;

/// The main application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Generic errors with a message.
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Create a generic error.
    pub fn other(msg: impl Into<String>) -> Self {
        AppError::Other(msg.into())
    }

    /// Get a user-friendly message for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find configuration directory. Please check your system settings."
                        .to_string()
                }
                ConfigError::CreateDirError(_) | ConfigError::WriteError(_) => {
                    "Could not save configuration. Please check file permissions.".to_string()
                }
                ConfigError::ReadError(_) => {
                    "Could not read configuration file. Please check the file exists and is readable.".to_string()
                }
                ConfigError::ParseError(_) => {
                    "Configuration file is invalid. Please check the file format.".to_string()
                }
                ConfigError::SerializeError(_) => {
                    "Could not save configuration. Internal error.".to_string()
                }
                ConfigError::ValidationError(msg) => format!("Configuration error: {}", msg),
                ConfigError::ProfileNotFound(name) => format!("Profile '{}' not found.", name),
            },
            AppError::Api(e) => match e {
                ApiError::NoToken => "You are not logged in.".to_string(),
                ApiError::InvalidToken(_) => {
                    "Your session token is invalid or has expired. Please log in again.".to_string()
                }
                ApiError::Encryption(_) | ApiError::Decryption(_) => {
                    "Could not protect the session. Check the connector secret.".to_string()
                }
                ApiError::Transport(_) => {
                    "Connection failed. Please check your network and JIRA host.".to_string()
                }
                ApiError::Remote(err) if err.status_code == 401 => {
                    "Authentication failed. Please log in again.".to_string()
                }
                ApiError::Remote(err) => format!("JIRA rejected the request: {}", err),
                ApiError::MissingPathParameter(name) => {
                    format!("Missing required argument '{}'.", name)
                }
                ApiError::UnknownMethod(name) => format!("Unknown method '{}'.", name),
                ApiError::InvalidResponse(_) => {
                    "Unexpected response from JIRA. Please try again.".to_string()
                }
                ApiError::Keyring(_) => {
                    "Could not access secure storage for the session token.".to_string()
                }
            },
            AppError::Other(msg) => msg.clone(),
        }
    }

    /// Get a suggested action for the user.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::Api(e) if e.is_auth_failure() => {
                Some("Run 'jira-connector login' to obtain a new token.")
            }
            AppError::Api(ApiError::Encryption(_)) | AppError::Api(ApiError::Decryption(_)) => {
                Some("Set JIRA_CONNECTOR_SECRET to the secret used at login.")
            }
            AppError::Api(ApiError::Transport(_)) => Some("Check the profile's protocol and host."),
            AppError::Config(ConfigError::ProfileNotFound(_)) => {
                Some("Add the profile to the configuration file.")
            }
            _ => None,
        }
    }

    /// The process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Api(e) if e.is_auth_failure() => 3,
            AppError::Api(_) => 2,
            _ => 1,
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
