//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sparksonic_core::{CustomerId, Email};

/// A registered customer account, as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Public customer identifier (`CUST-…`).
    pub customer_id: CustomerId,
    /// Login email, unique across users.
    pub email: Email,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The public view of a [`User`]; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub customer_id: CustomerId,
    pub email: Email,
    pub full_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            customer_id: user.customer_id,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
