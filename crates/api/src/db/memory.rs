//! Thread-safe in-memory [`DocumentStore`] for tests and local development.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::{
    Collection, Document, DocumentStore, Filter, RepositoryError, StoreFuture, UpdateOutcome,
};

type CollectionMap = Arc<RwLock<HashMap<Collection, Vec<Document>>>>;

/// Process-local store that keeps documents in insertion order.
///
/// Cloning shares the underlying data.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(CollectionMap);

impl MemoryStore {
    /// Number of documents currently stored in `collection`.
    #[must_use]
    pub fn len(&self, collection: Collection) -> usize {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&collection)
            .map_or(0, Vec::len)
    }

    /// Whether `collection` holds no documents.
    #[must_use]
    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    fn find_now(
        map: &CollectionMap,
        collection: Collection,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Vec<Document> {
        let guard = map.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter.matches(doc))
                    .take(limit.unwrap_or(usize::MAX))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn insert_now(
        map: &CollectionMap,
        collection: Collection,
        document: Document,
    ) -> Result<(), RepositoryError> {
        let mut guard = map.write().unwrap_or_else(PoisonError::into_inner);
        let docs = guard.entry(collection).or_default();

        check_unique(collection, docs, &document, None)?;
        docs.push(document);

        Ok(())
    }

    fn update_now(
        map: &CollectionMap,
        collection: Collection,
        filter: &Filter,
        patch: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome, RepositoryError> {
        let mut guard = map.write().unwrap_or_else(PoisonError::into_inner);
        let docs = guard.entry(collection).or_default();

        if let Some(index) = docs.iter().position(|doc| filter.matches(doc)) {
            let mut updated = docs.get(index).cloned().unwrap_or_default();
            updated.extend(patch);
            check_unique(collection, docs, &updated, Some(index))?;
            if let Some(slot) = docs.get_mut(index) {
                *slot = updated;
            }
            return Ok(UpdateOutcome::Updated);
        }

        if !upsert {
            return Ok(UpdateOutcome::NotFound);
        }

        let mut document = filter.as_document().clone();
        document.extend(patch);
        check_unique(collection, docs, &document, None)?;
        docs.push(document);

        Ok(UpdateOutcome::Upserted)
    }
}

/// Reject `candidate` if it shares a unique key value with another document.
fn check_unique(
    collection: Collection,
    docs: &[Document],
    candidate: &Document,
    skip: Option<usize>,
) -> Result<(), RepositoryError> {
    for key in collection.unique_keys() {
        let Some(value) = candidate.get(*key).filter(|v| !v.is_null()) else {
            continue;
        };

        let taken = docs
            .iter()
            .enumerate()
            .any(|(i, doc)| Some(i) != skip && doc.get(*key) == Some(value));

        if taken {
            return Err(RepositoryError::Conflict((*key).to_owned()));
        }
    }
    Ok(())
}

impl DocumentStore for MemoryStore {
    fn find_one<'a>(
        &'a self,
        collection: Collection,
        filter: &'a Filter,
    ) -> StoreFuture<'a, Option<Document>> {
        let map = self.0.clone();

        Box::pin(async move { Ok(Self::find_now(&map, collection, filter, Some(1)).pop()) })
    }

    fn find<'a>(
        &'a self,
        collection: Collection,
        filter: &'a Filter,
        limit: Option<usize>,
    ) -> StoreFuture<'a, Vec<Document>> {
        let map = self.0.clone();

        Box::pin(async move { Ok(Self::find_now(&map, collection, filter, limit)) })
    }

    fn insert_one(&self, collection: Collection, document: Document) -> StoreFuture<'_, ()> {
        let map = self.0.clone();

        Box::pin(async move { Self::insert_now(&map, collection, document) })
    }

    fn update_one<'a>(
        &'a self,
        collection: Collection,
        filter: &'a Filter,
        patch: Document,
        upsert: bool,
    ) -> StoreFuture<'a, UpdateOutcome> {
        let map = self.0.clone();

        Box::pin(async move { Self::update_now(&map, collection, filter, patch, upsert) })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[tokio::test]
    async fn insert_then_find_in_insertion_order() {
        let store = MemoryStore::default();
        for n in 1..=3 {
            store
                .insert_one(
                    Collection::Quotes,
                    doc(json!({"quote_id": format!("QT-{n}"), "email": "a@b.co"})),
                )
                .await
                .unwrap();
        }

        let found = store
            .find(Collection::Quotes, &Filter::all().eq("email", "a@b.co"), None)
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|d| d["quote_id"].clone()).collect();
        assert_eq!(ids, vec![json!("QT-1"), json!("QT-2"), json!("QT-3")]);

        let limited = store
            .find(Collection::Quotes, &Filter::all(), Some(2))
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = MemoryStore::default();
        store
            .insert_one(Collection::Contacts, doc(json!({"contact_id": "CNT-1"})))
            .await
            .unwrap();

        assert_eq!(store.len(Collection::Contacts), 1);
        assert!(store.is_empty(Collection::Quotes));
        assert!(
            store
                .find_one(Collection::Quotes, &Filter::all())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn duplicate_unique_key_conflicts() {
        let store = MemoryStore::default();
        store
            .insert_one(
                Collection::Users,
                doc(json!({"email": "a@b.co", "customer_id": "CUST-1"})),
            )
            .await
            .unwrap();

        let err = store
            .insert_one(
                Collection::Users,
                doc(json!({"email": "a@b.co", "customer_id": "CUST-2"})),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(ref key) if key == "email"));
        assert_eq!(store.len(Collection::Users), 1);
    }

    #[tokio::test]
    async fn concurrent_duplicate_inserts_keep_one() {
        let store = MemoryStore::default();
        let mut handles = Vec::new();
        for n in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert_one(
                        Collection::Users,
                        doc(json!({"email": "race@b.co", "customer_id": format!("CUST-{n}")})),
                    )
                    .await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.len(Collection::Users), 1);
    }

    #[tokio::test]
    async fn update_patches_first_match_only() {
        let store = MemoryStore::default();
        for id in ["TKT-1", "TKT-2"] {
            store
                .insert_one(
                    Collection::Tickets,
                    doc(json!({"ticket_id": id, "owner": "a", "status": "open"})),
                )
                .await
                .unwrap();
        }

        let outcome = store
            .update_one(
                Collection::Tickets,
                &Filter::all().eq("owner", "a"),
                doc(json!({"status": "closed"})),
                false,
            )
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Updated);

        let closed = store
            .find(
                Collection::Tickets,
                &Filter::all().eq("status", "closed"),
                None,
            )
            .await
            .unwrap();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0]["ticket_id"], json!("TKT-1"));
    }

    #[tokio::test]
    async fn update_without_match() {
        let store = MemoryStore::default();
        let filter = Filter::all().eq("project_id", "PRJ-1");

        let outcome = store
            .update_one(
                Collection::Projects,
                &filter,
                doc(json!({"title": "Roof"})),
                false,
            )
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::NotFound);
        assert!(store.is_empty(Collection::Projects));

        let outcome = store
            .update_one(
                Collection::Projects,
                &filter,
                doc(json!({"title": "Roof"})),
                true,
            )
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Upserted);

        let stored = store
            .find_one(Collection::Projects, &filter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored["title"], json!("Roof"));
        assert_eq!(stored["project_id"], json!("PRJ-1"));
    }
}
