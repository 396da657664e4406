//! Quote request route handlers.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sparksonic_core::{Email, QuoteId, QuoteStatus};

use super::{Created, optional, required};
use crate::db::quotes::QuoteRepository;
use crate::error::{ApiJson, Result, add_breadcrumb};
use crate::middleware::CurrentUser;
use crate::models::Quote;
use crate::state::AppState;

/// Quote form data. No account is needed to submit one.
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub service: String,
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub preferred_date: Option<String>,
    pub phone: String,
    pub email: Email,
}

#[derive(Debug, Serialize)]
pub struct QuoteRef {
    pub quote_id: QuoteId,
}

/// Store a quote request and notify the business.
///
/// POST /api/quotes
#[instrument(skip_all, fields(email = %form.email, service = %form.service))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<QuoteRequest>,
) -> Result<Json<Created<QuoteRef>>> {
    let now = Utc::now();
    let quote = Quote {
        quote_id: QuoteId::generate(),
        service: required("service", &form.service)?,
        description: required("description", &form.description)?,
        location: required("location", &form.location)?,
        preferred_date: optional(form.preferred_date.as_deref()),
        phone: required("phone", &form.phone)?,
        email: form.email,
        status: QuoteStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    QuoteRepository::new(state.store()).create(&quote).await?;

    tracing::info!(quote_id = %quote.quote_id, "Quote request stored");
    add_breadcrumb(
        "quotes",
        "Quote submitted",
        Some(&[("quote_id", quote.quote_id.as_str())]),
    );

    state.email().notify_quote(&quote).await;

    Ok(Json(Created {
        message: "Quote request submitted",
        id: QuoteRef {
            quote_id: quote.quote_id,
        },
    }))
}

/// Quotes submitted with the caller's email.
///
/// GET /api/quotes/user
pub async fn list_for_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Quote>>> {
    let quotes = QuoteRepository::new(state.store())
        .list_by_email(&user.email)
        .await?;

    Ok(Json(quotes))
}
