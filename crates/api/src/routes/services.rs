//! Service catalog handler.

use axum::Json;

use crate::models::{SERVICES, Service};

/// GET /api/services
pub async fn list() -> Json<&'static [Service]> {
    let catalog: &'static [Service] = &SERVICES;
    Json(catalog)
}
