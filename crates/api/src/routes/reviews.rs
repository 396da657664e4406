//! Google rating proxy handler.

use axum::{Json, extract::State};

use crate::models::ReviewSummary;
use crate::state::AppState;

/// Rating summary. Always 200: upstream failures serve the fallback.
///
/// GET /api/reviews
pub async fn summary(State(state): State<AppState>) -> Json<ReviewSummary> {
    Json(state.reviews().fetch().await.into_summary())
}
