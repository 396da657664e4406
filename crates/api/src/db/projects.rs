//! Portfolio project repository.

use super::{Collection, DocumentStore, Filter, RepositoryError, from_document, to_document};
use crate::models::Project;

/// Maximum number of projects returned by the public listing.
pub const PROJECT_LIST_LIMIT: usize = 12;

/// Repository for portfolio projects.
pub struct ProjectRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ProjectRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Up to [`PROJECT_LIST_LIMIT`] projects in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or a document is invalid.
    pub async fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        self.store
            .find(Collection::Projects, &Filter::all(), Some(PROJECT_LIST_LIMIT))
            .await?
            .into_iter()
            .map(|doc| from_document(Collection::Projects, doc))
            .collect()
    }

    /// Persist a project. Used by the seeding CLI.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the project ID already exists.
    pub async fn create(&self, project: &Project) -> Result<(), RepositoryError> {
        let doc = to_document(project)?;
        self.store.insert_one(Collection::Projects, doc).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sparksonic_core::ProjectId;

    use super::*;
    use crate::db::MemoryStore;

    #[tokio::test]
    async fn test_list_is_capped() {
        let store = MemoryStore::default();
        let repo = ProjectRepository::new(&store);

        for n in 0..15 {
            repo.create(&Project {
                project_id: ProjectId::generate(),
                title: format!("Project {n}"),
                location: "Luxembourg City".to_owned(),
                date: "2025-01-15".to_owned(),
                category: "Solar Panels".to_owned(),
                image: "https://example.com/p.jpg".to_owned(),
                description: "Rooftop array".to_owned(),
                details: serde_json::Map::new(),
            })
            .await
            .unwrap();
        }

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), PROJECT_LIST_LIMIT);
        assert_eq!(listed[0].title, "Project 0");
    }
}
