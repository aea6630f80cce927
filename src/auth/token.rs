//! HS256 JSON Web Tokens.
//!
//! Compact JWS with an HMAC-SHA256 signature over `header.claims`, both
//! segments base64url without padding.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::models::ApplicationUser;

type HmacSha256 = Hmac<Sha256>;

pub const MIN_KEY_LENGTH: usize = 32;
pub const DEFAULT_TOKEN_LIFETIME_DAYS: i64 = 30;
/// Clock skew tolerated on `nbf`.
const NOT_BEFORE_LEEWAY_SECS: i64 = 30;
const ALGORITHM: &str = "HS256";

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Signing key must be at least {min} bytes, got {actual}")]
    KeyTooShort { min: usize, actual: usize },

    #[error("Invalid signing key")]
    InvalidKey,

    #[error("Malformed token")]
    Malformed,

    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Token not yet valid")]
    NotYetValid,

    #[error("Token issuer mismatch")]
    WrongIssuer,

    #[error("Token audience mismatch")]
    WrongAudience,

    #[error("Token serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Process-wide signing configuration, immutable after startup.
#[derive(Clone)]
pub struct JwtOptions {
    key: Zeroizing<Vec<u8>>,
    pub issuer: String,
    pub audience: String,
    pub lifetime: Duration,
}

impl fmt::Debug for JwtOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtOptions")
            .field("key", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl JwtOptions {
    pub fn new(
        key: impl Into<Vec<u8>>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Result<Self, TokenError> {
        let key = Zeroizing::new(key.into());
        if key.len() < MIN_KEY_LENGTH {
            return Err(TokenError::KeyTooShort {
                min: MIN_KEY_LENGTH,
                actual: key.len(),
            });
        }
        Ok(Self {
            key,
            issuer: issuer.into(),
            audience: audience.into(),
            lifetime: Duration::days(DEFAULT_TOKEN_LIFETIME_DAYS),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub name: String,
    pub email: String,
    /// One entry per held role.
    #[serde(default)]
    pub role: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Issues and validates access tokens. Pure: no storage, no side effects.
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    options: Arc<JwtOptions>,
}

impl TokenGenerator {
    pub fn new(options: JwtOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &JwtOptions {
        &self.options
    }

    pub fn generate_token(
        &self,
        user: &ApplicationUser,
        roles: &[String],
    ) -> Result<String, TokenError> {
        self.generate_token_at(user, roles, Utc::now())
    }

    pub fn generate_token_at(
        &self,
        user: &ApplicationUser,
        roles: &[String],
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = TokenClaims {
            sub: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: roles.to_vec(),
            iss: self.options.issuer.clone(),
            aud: self.options.audience.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + self.options.lifetime).timestamp(),
        };
        let header = Header {
            alg: ALGORITHM.into(),
            typ: "JWT".into(),
        };

        let message = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
        );
        let signature = URL_SAFE_NO_PAD.encode(self.mac(&message)?.finalize().into_bytes());
        Ok(format!("{message}.{signature}"))
    }

    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Check structure, signature, issuer, audience and validity window.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header: Header = decode_segment(header_b64)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed)?;
        let message = &token[..header_b64.len() + 1 + claims_b64.len()];
        self.mac(message)?
            .verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims: TokenClaims = decode_segment(claims_b64)?;
        if claims.iss != self.options.issuer {
            return Err(TokenError::WrongIssuer);
        }
        if claims.aud != self.options.audience {
            return Err(TokenError::WrongAudience);
        }
        let now = now.timestamp();
        if now >= claims.exp {
            return Err(TokenError::Expired);
        }
        if now + NOT_BEFORE_LEEWAY_SECS < claims.nbf {
            return Err(TokenError::NotYetValid);
        }
        Ok(claims)
    }

    fn mac(&self, message: &str) -> Result<HmacSha256, TokenError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.options.key)
            .map_err(|_| TokenError::InvalidKey)?;
        mac.update(message.as_bytes());
        Ok(mac)
    }
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}
