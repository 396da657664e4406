//! Support ticket repository.

use chrono::{DateTime, Utc};
use serde_json::Value;

use sparksonic_core::{Email, TicketId};

use super::{
    Collection, Document, DocumentStore, Filter, RepositoryError, UpdateOutcome, from_document,
    to_document,
};
use crate::models::{Ticket, TicketUpdate};

/// Repository for support tickets.
pub struct TicketRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> TicketRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Persist a new ticket.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the insert fails.
    pub async fn create(&self, ticket: &Ticket) -> Result<(), RepositoryError> {
        let doc = to_document(ticket)?;
        self.store.insert_one(Collection::Tickets, doc).await
    }

    /// All tickets owned by `email`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or a document is invalid.
    pub async fn list_by_customer_email(
        &self,
        email: &Email,
    ) -> Result<Vec<Ticket>, RepositoryError> {
        let filter = Filter::all().eq("customer_email", email.as_str());

        self.store
            .find(Collection::Tickets, &filter, None)
            .await?
            .into_iter()
            .map(|doc| from_document(Collection::Tickets, doc))
            .collect()
    }

    /// Apply `update` to the ticket if `owner` owns it.
    ///
    /// Returns `false` when no such ticket belongs to `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the update fails.
    pub async fn update_for_owner(
        &self,
        ticket_id: &TicketId,
        owner: &Email,
        update: &TicketUpdate,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let filter = Filter::all()
            .eq("ticket_id", ticket_id.as_str())
            .eq("customer_email", owner.as_str());

        let mut patch = Document::new();
        if let Some(status) = update.status {
            patch.insert("status".to_owned(), Value::String(status.to_string()));
        }
        if let Some(response) = &update.response {
            patch.insert("response".to_owned(), Value::String(response.clone()));
        }
        let updated_at =
            serde_json::to_value(now).map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        patch.insert("updated_at".to_owned(), updated_at);

        let outcome = self
            .store
            .update_one(Collection::Tickets, &filter, patch, false)
            .await?;

        Ok(outcome == UpdateOutcome::Updated)
    }
}
