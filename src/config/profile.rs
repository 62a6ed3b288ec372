//! JIRA profile configuration.

use serde::{Deserialize, Serialize};

use super::settings::ConnectorSettings;
use super::{ConfigError, Result};

fn default_protocol() -> String {
    "https".to_string()
}

fn default_prefix() -> String {
    "Jira".to_string()
}

/// A JIRA profile configuration.
///
/// Profiles store connection details for a JIRA instance. Issued tokens are
/// stored separately in the OS keychain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// The name of this profile.
    ///
    /// Must be non-empty and unique across all profiles.
    pub name: String,

    /// URL scheme: `http` or `https`.
    #[serde(default = "default_protocol")]
    pub protocol: String,

    /// The JIRA host, e.g. "jira.example.com" or "localhost:8080".
    pub host: String,

    /// Model name prefix.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// User name to log in with when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Profile {
    /// Create a new profile with the default protocol and prefix.
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            protocol: default_protocol(),
            host: host.into(),
            prefix: default_prefix(),
            username: None,
        }
    }

    /// Validate this profile.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` with details if validation fails.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "profile name cannot be empty".to_string(),
            ));
        }

        if self.name.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "profile name '{}' cannot contain whitespace",
                self.name
            )));
        }

        if self.protocol != "https" && self.protocol != "http" {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': protocol must be http or https",
                self.name
            )));
        }

        if self.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': host cannot be empty",
                self.name
            )));
        }

        if self.host.contains("://") {
            return Err(ConfigError::ValidationError(format!(
                "profile '{}': host must not include a scheme",
                self.name
            )));
        }

        Ok(())
    }

    /// Build connector settings for this profile.
    pub fn connector_settings(
        &self,
        secret: impl Into<String>,
        default_token: Option<String>,
        token_ttl_secs: u64,
    ) -> ConnectorSettings {
        ConnectorSettings {
            name: self.name.clone(),
            protocol: self.protocol.clone(),
            host: self.host.clone(),
            prefix: self.prefix.clone(),
            secret: secret.into(),
            default_token,
            token_ttl_secs,
        }
    }
}
