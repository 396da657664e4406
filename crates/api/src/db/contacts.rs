//! Contact inquiry repository.

use super::{Collection, DocumentStore, RepositoryError, to_document};
use crate::models::Contact;

/// Repository for contact form submissions. Write-only from the API.
pub struct ContactRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ContactRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Persist a contact inquiry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the insert fails.
    pub async fn create(&self, contact: &Contact) -> Result<(), RepositoryError> {
        let doc = to_document(contact)?;
        self.store.insert_one(Collection::Contacts, doc).await
    }
}
