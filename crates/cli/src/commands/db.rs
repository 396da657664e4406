//! Store bootstrap commands.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use tracing::info;

use sparksonic_api::db::PgDocumentStore;

/// Create the documents table and its indexes. Safe to run repeatedly.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is missing or a statement fails.
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    info!("Connecting to database...");
    let store = PgDocumentStore::connect(&database_url).await?;

    info!("Creating schema...");
    store.ensure_schema().await?;

    info!("Schema ready");
    Ok(())
}
