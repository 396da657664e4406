//! Persistence gateway over named document collections.
//!
//! # Collections
//!
//! - `users` - Customer accounts (unique `email`, `customer_id`)
//! - `quotes` - Anonymous quote requests (unique `quote_id`)
//! - `tickets` - Support tickets owned by a user (unique `ticket_id`)
//! - `contacts` - Contact form inquiries (unique `contact_id`)
//! - `projects` - Portfolio entries, read-only to the API (unique `project_id`)
//!
//! Records are stored as JSON documents. Handlers never talk to a backend
//! directly; they go through the typed repositories in this module, which
//! serialize models to [`Document`]s and back.
//!
//! # Backends
//!
//! - [`PgDocumentStore`] - `PostgreSQL` (one JSONB table)
//! - [`MemoryStore`] - process-local, for tests and `memory://` URLs
//!
//! Both enforce each collection's unique keys, so a duplicate insert fails
//! with [`RepositoryError::Conflict`] even when two requests race past a
//! `find_one` pre-check.

pub mod contacts;
pub mod memory;
pub mod postgres;
pub mod projects;
pub mod quotes;
pub mod tickets;
pub mod users;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

/// A stored record: a JSON object.
pub type Document = serde_json::Map<String, Value>;

/// Boxed future returned by [`DocumentStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RepositoryError>> + Send + 'a>>;

/// Errors that can occur in repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or does not match the model.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Unique key violation; carries the offending field name.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Named record collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Quotes,
    Tickets,
    Contacts,
    Projects,
}

impl Collection {
    /// Every collection, for schema bootstrap.
    pub const ALL: [Self; 5] = [
        Self::Users,
        Self::Quotes,
        Self::Tickets,
        Self::Contacts,
        Self::Projects,
    ];

    /// Collection name as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Quotes => "quotes",
            Self::Tickets => "tickets",
            Self::Contacts => "contacts",
            Self::Projects => "projects",
        }
    }

    /// Top-level fields that must be unique within the collection.
    #[must_use]
    pub const fn unique_keys(self) -> &'static [&'static str] {
        match self {
            Self::Users => &["email", "customer_id"],
            Self::Quotes => &["quote_id"],
            Self::Tickets => &["ticket_id"],
            Self::Contacts => &["contact_id"],
            Self::Projects => &["project_id"],
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equality filter: a document matches when every listed field is equal.
///
/// An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Document);

impl Filter {
    /// A filter matching every document.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Add an equality condition on a top-level field.
    #[must_use]
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_owned(), value.into());
        self
    }

    /// Whether `document` satisfies every condition.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        self.0
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }

    /// The conditions as a JSON object.
    #[must_use]
    pub const fn as_document(&self) -> &Document {
        &self.0
    }
}

/// Result of an `update_one` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// An existing document matched and was patched.
    Updated,
    /// Nothing matched and a new document was inserted.
    Upserted,
    /// Nothing matched and `upsert` was false.
    NotFound,
}

/// Storage backend contract for document collections.
///
/// No transactions and no schema: callers validate before writing. The only
/// structural guarantee is uniqueness of [`Collection::unique_keys`].
pub trait DocumentStore
where
    Self: Send + Sync,
{
    /// First document matching `filter`, in insertion order.
    fn find_one<'a>(
        &'a self,
        collection: Collection,
        filter: &'a Filter,
    ) -> StoreFuture<'a, Option<Document>>;

    /// All documents matching `filter`, in insertion order, up to `limit`.
    fn find<'a>(
        &'a self,
        collection: Collection,
        filter: &'a Filter,
        limit: Option<usize>,
    ) -> StoreFuture<'a, Vec<Document>>;

    /// Insert a new document.
    ///
    /// Fails with `RepositoryError::Conflict` on a unique key violation.
    fn insert_one(&self, collection: Collection, document: Document) -> StoreFuture<'_, ()>;

    /// Merge `patch` into the first document matching `filter`.
    ///
    /// With `upsert`, inserts `filter` merged with `patch` when nothing matches.
    fn update_one<'a>(
        &'a self,
        collection: Collection,
        filter: &'a Filter,
        patch: Document,
        upsert: bool,
    ) -> StoreFuture<'a, UpdateOutcome>;

    /// Check the backend is reachable.
    fn ping(&self) -> StoreFuture<'_, ()>;
}

/// Connect to the store named by `database_url`.
///
/// `memory://` yields a fresh [`MemoryStore`]; anything else is treated as a
/// `PostgreSQL` URL.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the connection cannot be established.
pub async fn connect(database_url: &SecretString) -> Result<Arc<dyn DocumentStore>, RepositoryError> {
    if database_url.expose_secret().starts_with("memory://") {
        tracing::warn!("Using in-memory store; data is lost on restart");
        return Ok(Arc::new(MemoryStore::default()));
    }

    let store = PgDocumentStore::connect(database_url).await?;
    Ok(Arc::new(store))
}

/// Serialize a model into a document.
pub(crate) fn to_document<T: Serialize>(value: &T) -> Result<Document, RepositoryError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(RepositoryError::DataCorruption(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(RepositoryError::DataCorruption(e.to_string())),
    }
}

/// Deserialize a document into a model.
pub(crate) fn from_document<T: DeserializeOwned>(
    collection: Collection,
    document: Document,
) -> Result<T, RepositoryError> {
    serde_json::from_value(Value::Object(document)).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid {collection} document: {e}"))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(Filter::all().matches(&doc(json!({"a": 1}))));
        assert!(Filter::all().matches(&Document::new()));
    }

    #[test]
    fn test_filter_requires_every_field() {
        let filter = Filter::all().eq("email", "a@b.co").eq("status", "open");

        assert!(filter.matches(&doc(json!({"email": "a@b.co", "status": "open", "x": 1}))));
        assert!(!filter.matches(&doc(json!({"email": "a@b.co", "status": "closed"}))));
        assert!(!filter.matches(&doc(json!({"email": "a@b.co"}))));
    }

    #[test]
    fn test_to_document_rejects_non_objects() {
        assert!(matches!(
            to_document(&42),
            Err(RepositoryError::DataCorruption(_))
        ));
        assert_eq!(
            to_document(&json!({"k": "v"})).unwrap().get("k"),
            Some(&json!("v"))
        );
    }

    #[test]
    fn test_from_document_reports_collection() {
        #[derive(serde::Deserialize)]
        struct Needs {
            #[allow(dead_code)]
            field: String,
        }

        let err = from_document::<Needs>(Collection::Quotes, Document::new())
            .err()
            .unwrap();
        assert!(err.to_string().contains("quotes"));
    }

    #[test]
    fn test_every_collection_has_a_unique_key() {
        for collection in Collection::ALL {
            assert!(!collection.unique_keys().is_empty(), "{collection}");
        }
    }
}
