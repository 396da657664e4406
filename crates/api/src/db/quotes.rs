//! Quote request repository.

use sparksonic_core::Email;

use super::{Collection, DocumentStore, Filter, RepositoryError, from_document, to_document};
use crate::models::Quote;

/// Repository for quote requests.
pub struct QuoteRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> QuoteRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Persist a new quote request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the insert fails.
    pub async fn create(&self, quote: &Quote) -> Result<(), RepositoryError> {
        let doc = to_document(quote)?;
        self.store.insert_one(Collection::Quotes, doc).await
    }

    /// All quotes submitted with `email`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or a document is invalid.
    pub async fn list_by_email(&self, email: &Email) -> Result<Vec<Quote>, RepositoryError> {
        let filter = Filter::all().eq("email", email.as_str());

        self.store
            .find(Collection::Quotes, &filter, None)
            .await?
            .into_iter()
            .map(|doc| from_document(Collection::Quotes, doc))
            .collect()
    }
}
