//! Token and session-identifier protection.
//!
//! The session identifier JIRA understands is a Basic credential. It is
//! encrypted with ChaCha20-Poly1305 before being embedded in an HS256 JWT,
//! so callers only ever handle the signed token.
//!
//! Encryption is deterministic: the nonce is derived from the key and the
//! plaintext, so the same identifier always encrypts to the same string.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL, Engine};
use chacha20poly1305::{aead::Aead, ChaCha20Poly1305, Key, KeyInit, Nonce};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use super::error::{ApiError, Result};

/// Default token lifetime in seconds.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// Nonce length for ChaCha20-Poly1305 (12 bytes).
const NONCE_LEN: usize = 12;

/// Claims added by the signer and removed again on verification.
const ISSUED_AT_CLAIM: &str = "iat";
const EXPIRY_CLAIM: &str = "exp";

/// Encrypts session identifiers and signs session descriptors.
#[derive(Clone)]
pub struct TokenCodec {
    secret: String,
    ttl_secs: u64,
}

impl TokenCodec {
    /// Create a codec from the configured secret.
    ///
    /// A blank secret is accepted here; every operation then fails.
    pub fn new(secret: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs,
        }
    }

    /// The configured token lifetime.
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    fn secret_bytes(&self) -> Option<&[u8]> {
        if self.secret.trim().is_empty() {
            None
        } else {
            Some(self.secret.as_bytes())
        }
    }

    fn cipher_key(&self) -> Option<[u8; 32]> {
        self.secret_bytes().map(|secret| Sha256::digest(secret).into())
    }

    /// Encrypt `plaintext` into an opaque base64url string.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let key = self
            .cipher_key()
            .ok_or_else(|| ApiError::Encryption("secret is not configured".to_string()))?;

        let nonce = derive_nonce(&key, plaintext.as_bytes());
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|e| ApiError::Encryption(e.to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(BASE64_URL.encode(sealed))
    }

    /// Recover the plaintext produced by [`TokenCodec::encrypt`].
    pub fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let key = self
            .cipher_key()
            .ok_or_else(|| ApiError::Decryption("secret is not configured".to_string()))?;

        let sealed = BASE64_URL
            .decode(ciphertext)
            .map_err(|e| ApiError::Decryption(format!("malformed input: {}", e)))?;
        if sealed.len() <= NONCE_LEN {
            return Err(ApiError::Decryption("input too short".to_string()));
        }

        let (nonce, body) = sealed.split_at(NONCE_LEN);
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), body)
            .map_err(|_| ApiError::Decryption("input was tampered with".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|_| ApiError::Decryption("plaintext is not valid UTF-8".to_string()))
    }

    /// Sign a session descriptor into a JWT with `iat` and `exp` claims.
    pub fn generate_token(&self, descriptor: &Map<String, Value>) -> Result<String> {
        let secret = self
            .secret_bytes()
            .ok_or_else(|| ApiError::Encryption("signing secret is not configured".to_string()))?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ApiError::Encryption(format!("system time error: {}", e)))?
            .as_secs();

        let mut claims = descriptor.clone();
        claims.insert(ISSUED_AT_CLAIM.to_string(), Value::from(now));
        claims.insert(EXPIRY_CLAIM.to_string(), Value::from(now + self.ttl_secs));

        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
            .map_err(|e| ApiError::Encryption(format!("failed to sign token: {}", e)))
    }

    /// Verify a JWT and return the descriptor it carries.
    pub fn verify_token(&self, token: &str) -> Result<Map<String, Value>> {
        let secret = self
            .secret_bytes()
            .ok_or_else(|| ApiError::InvalidToken("signing secret is not configured".to_string()))?;

        let data = decode::<Map<String, Value>>(
            token,
            &DecodingKey::from_secret(secret),
            &Validation::default(),
        )
        .map_err(|err| {
            let reason = match err.kind() {
                ErrorKind::ExpiredSignature => "token expired",
                ErrorKind::InvalidSignature => "invalid signature",
                ErrorKind::InvalidToken => "malformed token",
                _ => "token validation failed",
            };
            ApiError::InvalidToken(reason.to_string())
        })?;

        let mut descriptor = data.claims;
        descriptor.remove(ISSUED_AT_CLAIM);
        descriptor.remove(EXPIRY_CLAIM);
        Ok(descriptor)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"<redacted>")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

/// Derive a nonce from the key and plaintext.
fn derive_nonce(key: &[u8; 32], plaintext: &[u8]) -> [u8; NONCE_LEN] {
    let digest = Sha256::new()
        .chain_update(b"jira-connector/nonce")
        .chain_update(key)
        .chain_update(plaintext)
        .finalize();
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&digest[..NONCE_LEN]);
    nonce
}
