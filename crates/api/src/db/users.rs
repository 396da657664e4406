//! User repository.

use sparksonic_core::Email;

use super::{Collection, DocumentStore, Filter, RepositoryError, from_document, to_document};
use crate::models::User;

/// Repository for customer accounts.
pub struct UserRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored document is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let filter = Filter::all().eq("email", email.as_str());

        self.store
            .find_one(Collection::Users, &filter)
            .await?
            .map(|doc| from_document(Collection::Users, doc))
            .transpose()
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or customer ID already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        let doc = to_document(user)?;
        self.store.insert_one(Collection::Users, doc).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use sparksonic_core::CustomerId;

    use super::*;
    use crate::db::MemoryStore;

    fn user(email: &str) -> User {
        let now = Utc::now();
        User {
            customer_id: CustomerId::generate(),
            email: Email::parse(email).unwrap(),
            password_hash: "hash".to_owned(),
            full_name: "Test User".to_owned(),
            phone: Some("+352 000".to_owned()),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_by_email() {
        let store = MemoryStore::default();
        let repo = UserRepository::new(&store);
        let created = user("alice@example.com");

        repo.create(&created).await.unwrap();
        let found = repo
            .get_by_email(&created.email)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.customer_id, created.customer_id);
        assert_eq!(found.phone.as_deref(), Some("+352 000"));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::default();
        let repo = UserRepository::new(&store);

        repo.create(&user("alice@example.com")).await.unwrap();
        let err = repo.create(&user("alice@example.com")).await.unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(ref key) if key == "email"));
    }

    #[tokio::test]
    async fn test_unknown_email_is_none() {
        let store = MemoryStore::default();
        let repo = UserRepository::new(&store);
        let email = Email::parse("nobody@example.com").unwrap();

        assert!(repo.get_by_email(&email).await.unwrap().is_none());
    }
}
