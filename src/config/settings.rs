//! Connector and application settings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_TOKEN_TTL_SECS;

/// Application-wide settings stored in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The name of the default profile to use.
    pub default_profile: Option<String>,
    /// Lifetime of issued tokens in seconds.
    pub token_ttl_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_profile: None,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }
}

/// Construction-time configuration of a connector.
///
/// Owned by the connector and never changed after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectorSettings {
    /// Connector instance name.
    pub name: String,
    /// URL scheme, `https` unless configured otherwise.
    pub protocol: String,
    /// JIRA host, optionally with a port and path.
    pub host: String,
    /// Prefix for the model names reported to a host framework.
    pub prefix: String,
    /// Secret used to encrypt session identifiers and sign tokens.
    pub secret: String,
    /// Token used when a call does not supply one.
    pub default_token: Option<String>,
    /// Lifetime of issued tokens in seconds.
    pub token_ttl_secs: u64,
}

impl ConnectorSettings {
    /// Create settings for a host with defaults for everything else.
    pub fn new(host: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            secret: secret.into(),
            ..Self::default()
        }
    }

    /// Set the URL scheme.
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Set the model name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the default token.
    pub fn with_default_token(mut self, token: impl Into<String>) -> Self {
        self.default_token = Some(token.into());
        self
    }

    /// Set the token lifetime.
    pub fn with_token_ttl(mut self, ttl_secs: u64) -> Self {
        self.token_ttl_secs = ttl_secs;
        self
    }

    /// `protocol://host`, without a trailing slash.
    pub fn base_url(&self) -> String {
        let url = format!("{}://{}", self.protocol, self.host);
        url.trim_end_matches('/').to_string()
    }
}

impl Default for ConnectorSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            protocol: "https".to_string(),
            host: "jira".to_string(),
            prefix: "Jira".to_string(),
            secret: String::new(),
            default_token: None,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }
}

impl fmt::Debug for ConnectorSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorSettings")
            .field("name", &self.name)
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("prefix", &self.prefix)
            .field("secret", &"<redacted>")
            .field("default_token", &self.default_token.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}
