//! Portfolio listing handler.

use axum::{Json, extract::State};

use crate::db::projects::ProjectRepository;
use crate::error::Result;
use crate::models::Project;
use crate::state::AppState;

/// GET /api/projects
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Project>>> {
    let projects = ProjectRepository::new(state.store()).list().await?;
    Ok(Json(projects))
}
