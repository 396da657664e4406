//! Seed portfolio projects and generate review fixtures.
//!
//! Project files are YAML lists; `project_id` is optional and assigned when
//! missing:
//!
//! ```yaml
//! - title: Rooftop Solar Installation - 15kW
//!   location: Dudelange
//!   date: "2024-09-15"
//!   category: Solar Panels
//!   image: https://images.example/roof.jpg
//!   description: Residential solar installation on a semi-detached house.
//!   details:
//!     systemSize: 15kW
//! ```

use std::path::Path;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use sparksonic_api::db::{self, RepositoryError, projects::ProjectRepository};
use sparksonic_api::models::{Project, Review, ReviewSummary};
use sparksonic_api::services::reviews::fixtures::{generate_reviews, summarize};
use sparksonic_core::ProjectId;

/// Errors reading a seed file.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("project {index}: {message}")]
    Invalid { index: usize, message: String },
}

/// One entry of a project seed file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectSeed {
    #[serde(default)]
    project_id: Option<String>,
    title: String,
    location: String,
    date: String,
    category: String,
    image: String,
    description: String,
    #[serde(default)]
    details: Map<String, Value>,
}

/// Parse and validate a project seed file, assigning missing IDs.
///
/// # Errors
///
/// Returns `SeedError` if the YAML is malformed, an ID is invalid, a title is
/// blank, or a date is not `YYYY-MM-DD`.
pub fn parse_projects(content: &str) -> Result<Vec<Project>, SeedError> {
    let seeds: Vec<ProjectSeed> = serde_yaml::from_str(content)?;

    seeds
        .into_iter()
        .enumerate()
        .map(|(index, seed)| {
            let invalid = |message: String| SeedError::Invalid { index, message };

            let project_id = match seed.project_id.as_deref() {
                Some(id) => ProjectId::parse(id).map_err(|e| invalid(e.to_string()))?,
                None => ProjectId::generate(),
            };

            if seed.title.trim().is_empty() {
                return Err(invalid("title must not be empty".to_owned()));
            }

            chrono::NaiveDate::parse_from_str(&seed.date, "%Y-%m-%d")
                .map_err(|e| invalid(format!("date {:?}: {e}", seed.date)))?;

            Ok(Project {
                project_id,
                title: seed.title,
                location: seed.location,
                date: seed.date,
                category: seed.category,
                image: seed.image,
                description: seed.description,
                details: seed.details,
            })
        })
        .collect()
}

/// Insert the projects in `file`. Entries whose ID already exists are skipped.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the store fails.
pub async fn projects(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    info!(path = %file.display(), "Loading projects from file");

    // Validate before connecting to the store
    let content = tokio::fs::read_to_string(file).await?;
    let projects = parse_projects(&content)?;
    info!(projects = projects.len(), "Parsed projects");

    let database_url = super::database_url()?;
    let store = db::connect(&database_url).await?;
    let repo = ProjectRepository::new(store.as_ref());

    let mut inserted = 0usize;
    let mut skipped = 0usize;
    for project in &projects {
        match repo.create(project).await {
            Ok(()) => inserted += 1,
            Err(RepositoryError::Conflict(_)) => {
                warn!(project_id = %project.project_id, "Project already exists, skipping");
                skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!("Seeding complete!");
    info!("  Projects inserted: {inserted}");
    info!("  Projects skipped (already exist): {skipped}");

    Ok(())
}

/// Wrap a generated set in the summary document served by `/api/reviews`.
///
/// Unlike the served summary, every review is kept.
fn review_fixture(reviews: Vec<Review>) -> ReviewSummary {
    let summary = summarize(&reviews);
    ReviewSummary { reviews, ..summary }
}

/// Generate `count` synthetic reviews and write them as a pretty JSON
/// `{rating, total_reviews, reviews}` document.
///
/// # Errors
///
/// Returns an error if serialization or writing the output fails.
pub async fn reviews(
    count: usize,
    output: Option<&Path>,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();
    let reviews = match seed {
        Some(seed) => generate_reviews(&mut StdRng::seed_from_u64(seed), count, now),
        None => generate_reviews(&mut rand::rng(), count, now),
    };

    let fixture = review_fixture(reviews);
    let json = serde_json::to_string_pretty(&fixture)?;

    match output {
        Some(path) => {
            tokio::fs::write(path, json).await?;
            info!(
                count,
                rating = fixture.rating,
                path = %path.display(),
                "Wrote review fixtures"
            );
        }
        None => {
            use tokio::io::AsyncWriteExt;

            let mut stdout = tokio::io::stdout();
            stdout.write_all(json.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
        }
    }

    Ok(())
}
