//! Signed, time-limited access tokens (JWT, HMAC).
//!
//! Tokens carry the user's email as `sub` plus their `customer_id`, and are
//! valid while `now < exp`. Rotating `JWT_SECRET_KEY` invalidates every
//! outstanding token.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha384, Sha512};

use sparksonic_core::{CustomerId, Email};

use super::TokenError;
use crate::config::AuthConfig;

/// HMAC algorithm used to sign tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenAlgorithm {
    #[default]
    Hs256,
    Hs384,
    Hs512,
}

impl FromStr for TokenAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HS256" => Ok(Self::Hs256),
            "HS384" => Ok(Self::Hs384),
            "HS512" => Ok(Self::Hs512),
            other => Err(format!("unsupported algorithm {other} (expected HS256, HS384 or HS512)")),
        }
    }
}

/// Claims embedded in an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the user's email.
    pub sub: String,
    pub customer_id: String,
    /// Issued at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

enum SigningKey {
    Hs256(Hmac<Sha256>),
    Hs384(Hmac<Sha384>),
    Hs512(Hmac<Sha512>),
}

/// Issues and verifies access tokens with a process-wide secret.
pub struct TokenService {
    key: SigningKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let algorithm = match self.key {
            SigningKey::Hs256(_) => TokenAlgorithm::Hs256,
            SigningKey::Hs384(_) => TokenAlgorithm::Hs384,
            SigningKey::Hs512(_) => TokenAlgorithm::Hs512,
        };
        f.debug_struct("TokenService")
            .field("algorithm", &algorithm)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Build the signing key from configuration.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the key cannot be constructed.
    pub fn new(config: &AuthConfig) -> Result<Self, TokenError> {
        let secret = config.jwt_secret.expose_secret().as_bytes();
        let invalid = |e: hmac::digest::InvalidLength| TokenError::Signing(e.to_string());

        let key = match config.algorithm {
            TokenAlgorithm::Hs256 => {
                SigningKey::Hs256(Hmac::new_from_slice(secret).map_err(invalid)?)
            }
            TokenAlgorithm::Hs384 => {
                SigningKey::Hs384(Hmac::new_from_slice(secret).map_err(invalid)?)
            }
            TokenAlgorithm::Hs512 => {
                SigningKey::Hs512(Hmac::new_from_slice(secret).map_err(invalid)?)
            }
        };

        Ok(Self {
            key,
            ttl: config.token_ttl,
        })
    }

    /// How long issued tokens stay valid.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `email` valid from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if signing fails.
    pub fn issue(&self, email: &Email, customer_id: &CustomerId) -> Result<String, TokenError> {
        self.issue_at(email, customer_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// Timestamps are truncated to whole seconds.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if signing fails.
    pub fn issue_at(
        &self,
        email: &Email,
        customer_id: &CustomerId,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let claims = AccessClaims {
            sub: email.as_str().to_owned(),
            customer_id: customer_id.as_str().to_owned(),
            iat,
            exp: iat.saturating_add(self.ttl.num_seconds()),
        };

        let signed = match &self.key {
            SigningKey::Hs256(key) => claims.sign_with_key(key),
            SigningKey::Hs384(key) => claims.sign_with_key(key),
            SigningKey::Hs512(key) => claims.sign_with_key(key),
        };

        signed.map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token against the current time.
    ///
    /// # Errors
    ///
    /// Returns a `TokenError` describing why the token was rejected.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature and expiry as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidSignature` for a foreign key or algorithm,
    /// `TokenError::Expired` when `now >= exp`, and `TokenError::Malformed`
    /// for anything that does not decode.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<AccessClaims, TokenError> {
        let verified: Result<AccessClaims, jwt::Error> = match &self.key {
            SigningKey::Hs256(key) => token.verify_with_key(key),
            SigningKey::Hs384(key) => token.verify_with_key(key),
            SigningKey::Hs512(key) => token.verify_with_key(key),
        };

        let claims = verified.map_err(|e| match e {
            jwt::Error::InvalidSignature | jwt::Error::AlgorithmMismatch(..) => {
                TokenError::InvalidSignature
            }
            other => TokenError::Malformed(other.to_string()),
        })?;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
