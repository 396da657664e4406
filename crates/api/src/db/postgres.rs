//! `PostgreSQL` [`DocumentStore`].
//!
//! All collections live in one table:
//!
//! ```sql
//! documents (id BIGSERIAL, collection TEXT, body JSONB, created_at TIMESTAMPTZ)
//! ```
//!
//! Filters use JSONB containment (`body @> filter`), and every unique key in
//! [`Collection::unique_keys`] is backed by a partial unique expression index.
//! The `id` column is internal and never leaves this module.
//!
//! The schema is created by [`PgDocumentStore::ensure_schema`], which is
//! idempotent and is NOT run automatically on startup:
//! ```bash
//! cargo run -p sparksonic-cli -- db init
//! ```

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;

use super::{
    Collection, Document, DocumentStore, Filter, RepositoryError, StoreFuture, UpdateOutcome,
};

/// Document store backed by a `PostgreSQL` connection pool.
#[derive(Clone, Debug)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Create a connection pool with sensible defaults.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the connection cannot be established.
    pub async fn connect(database_url: &SecretString) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url.expose_secret())
            .await?;

        Ok(Self::new(pool))
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the documents table and its indexes if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        for statement in schema_statements() {
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn find_rows(
        &self,
        collection: Collection,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, RepositoryError> {
        let limit = limit.map_or(i64::MAX, |l| i64::try_from(l).unwrap_or(i64::MAX));

        let rows: Vec<Json<Document>> = sqlx::query_scalar(
            r"
            SELECT body
            FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY id
            LIMIT $3
            ",
        )
        .bind(collection.as_str())
        .bind(Json(filter.as_document()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|Json(doc)| doc).collect())
    }

    async fn insert_row(
        &self,
        collection: Collection,
        document: &Document,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO documents (collection, body) VALUES ($1, $2)")
            .bind(collection.as_str())
            .bind(Json(document))
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(collection, e))?;

        Ok(())
    }

    async fn update_row(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE documents
            SET body = body || $3
            WHERE id = (
                SELECT id FROM documents
                WHERE collection = $1 AND body @> $2
                ORDER BY id
                LIMIT 1
                FOR UPDATE
            )
            ",
        )
        .bind(collection.as_str())
        .bind(Json(filter.as_document()))
        .bind(Json(&patch))
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(collection, e))?;

        if result.rows_affected() > 0 {
            return Ok(UpdateOutcome::Updated);
        }

        if !upsert {
            return Ok(UpdateOutcome::NotFound);
        }

        let mut document = filter.as_document().clone();
        document.extend(patch);
        self.insert_row(collection, &document).await?;

        Ok(UpdateOutcome::Upserted)
    }
}

impl DocumentStore for PgDocumentStore {
    fn find_one<'a>(
        &'a self,
        collection: Collection,
        filter: &'a Filter,
    ) -> StoreFuture<'a, Option<Document>> {
        Box::pin(async move {
            let mut rows = self.find_rows(collection, filter, Some(1)).await?;
            Ok(rows.pop())
        })
    }

    fn find<'a>(
        &'a self,
        collection: Collection,
        filter: &'a Filter,
        limit: Option<usize>,
    ) -> StoreFuture<'a, Vec<Document>> {
        Box::pin(self.find_rows(collection, filter, limit))
    }

    fn insert_one(&self, collection: Collection, document: Document) -> StoreFuture<'_, ()> {
        Box::pin(async move { self.insert_row(collection, &document).await })
    }

    fn update_one<'a>(
        &'a self,
        collection: Collection,
        filter: &'a Filter,
        patch: Document,
        upsert: bool,
    ) -> StoreFuture<'a, UpdateOutcome> {
        Box::pin(self.update_row(collection, filter, patch, upsert))
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok(())
        })
    }
}

/// Translate a unique index violation into `RepositoryError::Conflict`.
fn map_unique_violation(collection: Collection, e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let key = db_err
            .constraint()
            .and_then(|name| {
                collection
                    .unique_keys()
                    .iter()
                    .find(|key| name == unique_index_name(collection, key))
            })
            .copied()
            .unwrap_or("unique key");
        return RepositoryError::Conflict(key.to_owned());
    }
    RepositoryError::Database(e)
}

fn unique_index_name(collection: Collection, key: &str) -> String {
    format!("documents_{}_{key}_key", collection.as_str())
}

/// DDL for the documents table, one statement per entry.
fn schema_statements() -> Vec<String> {
    let mut statements = vec![
        r"
        CREATE TABLE IF NOT EXISTS documents (
            id BIGSERIAL PRIMARY KEY,
            collection TEXT NOT NULL,
            body JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "
        .to_owned(),
        "CREATE INDEX IF NOT EXISTS documents_collection_idx ON documents (collection, id)"
            .to_owned(),
        "CREATE INDEX IF NOT EXISTS documents_body_idx ON documents USING GIN (body jsonb_path_ops)"
            .to_owned(),
    ];

    for collection in Collection::ALL {
        for key in collection.unique_keys() {
            statements.push(format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {index} ON documents ((body->>'{key}')) \
                 WHERE collection = '{name}'",
                index = unique_index_name(collection, key),
                name = collection.as_str(),
            ));
        }
    }

    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_has_unique_index_per_key() {
        let statements = schema_statements();

        assert!(
            statements
                .iter()
                .any(|s| s.contains("documents_users_email_key")
                    && s.contains("(body->>'email')")
                    && s.contains("WHERE collection = 'users'"))
        );

        let unique_count = statements
            .iter()
            .filter(|s| s.contains("CREATE UNIQUE INDEX"))
            .count();
        let expected: usize = Collection::ALL.iter().map(|c| c.unique_keys().len()).sum();
        assert_eq!(unique_count, expected);
    }

    #[test]
    fn test_schema_statements_are_idempotent() {
        for statement in schema_statements() {
            assert!(statement.contains("IF NOT EXISTS"), "{statement}");
        }
    }
}
