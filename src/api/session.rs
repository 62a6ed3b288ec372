//! Recovery of the transport session identifier from a signed token.

use tracing::trace;

use super::error::{ApiError, Result};
use super::security::TokenCodec;

/// Descriptor field carrying the encrypted session identifier inside a token.
pub const SESSION_ID_FIELD: &str = "sessionId";

/// Resolves which token a call uses and what session it stands for.
#[derive(Debug, Clone)]
pub struct SessionResolver {
    codec: TokenCodec,
    default_token: Option<String>,
}

impl SessionResolver {
    /// Create a resolver around a codec and an optional default token.
    pub fn new(codec: TokenCodec, default_token: Option<String>) -> Self {
        Self {
            codec,
            default_token: default_token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// The codec used to verify tokens.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Pick the token for a call.
    ///
    /// An explicit token wins over the configured default.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NoToken` if neither is available.
    pub fn get_token<'a>(&'a self, explicit: Option<&'a str>) -> Result<&'a str> {
        explicit
            .filter(|t| !t.trim().is_empty())
            .or(self.default_token.as_deref())
            .ok_or(ApiError::NoToken)
    }

    /// Verify `token` and return the session identifier it wraps.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidToken` if the token does not verify or does
    /// not carry a session identifier that decrypts.
    pub fn get_session_id(&self, token: &str) -> Result<String> {
        let descriptor = self.codec.verify_token(token)?;
        let sealed = descriptor
            .get(SESSION_ID_FIELD)
            .and_then(|v| v.as_str())
            .ok_or_else(|| ApiError::InvalidToken("token carries no session".to_string()))?;

        trace!("Token verified, recovering session identifier");
        self.codec
            .decrypt(sealed)
            .map_err(|e| ApiError::InvalidToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::security::DEFAULT_TOKEN_TTL_SECS;
    use serde_json::{json, Map, Value};

    fn codec() -> TokenCodec {
        TokenCodec::new("resolver-test-secret", DEFAULT_TOKEN_TTL_SECS)
    }

    fn token_for(codec: &TokenCodec, session_id: &str) -> String {
        let mut descriptor = Map::new();
        descriptor.insert("name".to_string(), json!("JSESSIONID"));
        descriptor.insert(
            SESSION_ID_FIELD.to_string(),
            Value::String(codec.encrypt(session_id).unwrap()),
        );
        codec.generate_token(&descriptor).unwrap()
    }

    #[test]
    fn test_explicit_token_wins() {
        let resolver = SessionResolver::new(codec(), Some("default".to_string()));
        assert_eq!(resolver.get_token(Some("explicit")).unwrap(), "explicit");
    }

    #[test]
    fn test_default_token_used() {
        let resolver = SessionResolver::new(codec(), Some("default".to_string()));
        assert_eq!(resolver.get_token(None).unwrap(), "default");
        assert_eq!(resolver.get_token(Some("")).unwrap(), "default");
    }

    #[test]
    fn test_no_token_available() {
        let resolver = SessionResolver::new(codec(), None);
        assert!(matches!(resolver.get_token(None), Err(ApiError::NoToken)));

        let resolver = SessionResolver::new(codec(), Some("  ".to_string()));
        assert!(matches!(resolver.get_token(None), Err(ApiError::NoToken)));
    }

    #[test]
    fn test_session_id_recovered() {
        let codec = codec();
        let token = token_for(&codec, "YWxpY2U6c2VjcmV0");
        let resolver = SessionResolver::new(codec, None);
        assert_eq!(resolver.get_session_id(&token).unwrap(), "YWxpY2U6c2VjcmV0");
    }

    #[test]
    fn test_token_without_session_rejected() {
        let codec = codec();
        let token = codec.generate_token(&Map::new()).unwrap();
        let resolver = SessionResolver::new(codec, None);
        assert!(matches!(
            resolver.get_session_id(&token),
            Err(ApiError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_foreign_token_rejected() {
        let token = token_for(&TokenCodec::new("other", 60), "abc");
        let resolver = SessionResolver::new(codec(), None);
        assert!(matches!(
            resolver.get_session_id(&token),
            Err(ApiError::InvalidToken(_))
        ));
    }
}
