//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors from bearer token issuance and verification.
///
/// The variants are kept apart for logging; clients see one 401 for all of them.
#[derive(Debug, Error)]
pub enum TokenError {
    /// No bearer token was presented.
    #[error("missing bearer token")]
    Missing,

    /// The token is not a well-formed JWT or its claims do not parse.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// Signature or algorithm does not match the configured key.
    #[error("invalid token signature")]
    InvalidSignature,

    /// The token is past its expiry.
    #[error("token expired")]
    Expired,

    /// The signing key could not be built or signing failed.
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] sparksonic_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The token subject no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Bearer token error.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
