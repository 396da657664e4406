//! Authentication service.
//!
//! Password registration and login for customer accounts, plus bearer token
//! issuance through [`TokenService`].

mod error;
mod token;

pub use error::{AuthError, TokenError};
pub use token::{AccessClaims, TokenAlgorithm, TokenService};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;

use sparksonic_core::{CustomerId, Email};

use crate::db::{DocumentStore, RepositoryError, users::UserRepository};
use crate::models::User;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum password length (bounds hashing cost).
const MAX_PASSWORD_LENGTH: usize = 128;

/// Input for [`AuthService::register`].
#[derive(Debug)]
pub struct Registration<'r> {
    pub email: &'r Email,
    pub password: &'r str,
    pub full_name: &'r str,
    pub phone: Option<&'r str>,
}

/// A successful login.
#[derive(Debug)]
pub struct LoginSession {
    pub user: User,
    pub access_token: String,
}

/// Authentication service.
///
/// Handles user registration, login and token resolution.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore, tokens: &'a TokenService) -> Self {
        Self {
            users: UserRepository::new(store),
            tokens,
        }
    }

    /// Register a new user with email and password.
    ///
    /// A customer ID collision is retried once with a fresh ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered,
    /// including when a concurrent registration wins the race.
    pub async fn register(&self, registration: Registration<'_>) -> Result<User, AuthError> {
        self.register_with_ids(registration, CustomerId::generate)
            .await
    }

    async fn register_with_ids<F>(
        &self,
        registration: Registration<'_>,
        mut next_id: F,
    ) -> Result<User, AuthError>
    where
        F: FnMut() -> CustomerId,
    {
        validate_password(registration.password)?;

        if self.users.get_by_email(registration.email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(registration.password)?;
        let now = Utc::now();

        let mut user = User {
            customer_id: next_id(),
            email: registration.email.clone(),
            password_hash,
            full_name: registration.full_name.to_owned(),
            phone: registration.phone.map(str::to_owned),
            created_at: now,
            updated_at: now,
        };

        let mut retried = false;
        loop {
            match self.users.create(&user).await {
                Ok(()) => return Ok(user),
                Err(RepositoryError::Conflict(key)) if key == "email" => {
                    return Err(AuthError::UserAlreadyExists);
                }
                Err(RepositoryError::Conflict(key)) if key == "customer_id" && !retried => {
                    tracing::warn!(
                        customer_id = %user.customer_id,
                        "Customer ID collision, retrying with a fresh ID"
                    );
                    retried = true;
                    user.customer_id = next_id();
                }
                Err(other) => return Err(AuthError::Repository(other)),
            }
        }
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &Email, password: &str) -> Result<LoginSession, AuthError> {
        let user = self
            .users
            .get_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.tokens.issue(&user.email, &user.customer_id)?;

        Ok(LoginSession { user, access_token })
    }

    /// Resolve verified token claims to the stored user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the subject no longer exists.
    pub async fn current_user(&self, claims: &AccessClaims) -> Result<User, AuthError> {
        let email = Email::parse(&claims.sub)?;

        self.users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    let length = password.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id with the library defaults.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
///
/// A malformed hash counts as a mismatch.
fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
