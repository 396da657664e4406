//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET   /api/health               - Liveness
//! GET   /api/health/ready         - Readiness (store reachable)
//!
//! # Auth
//! POST  /api/auth/register        - Create account, send welcome email
//! POST  /api/auth/login           - Issue bearer token
//! GET   /api/auth/me              - Caller's profile (bearer)
//!
//! # Forms
//! POST  /api/contact              - Contact inquiry, notify business + sender
//! POST  /api/quotes               - Quote request, notify business
//! GET   /api/quotes/user          - Caller's quotes (bearer)
//! POST  /api/tickets              - Open support ticket (bearer)
//! GET   /api/tickets/user         - Caller's tickets (bearer)
//! PATCH /api/tickets/{ticket_id}  - Update status/response of own ticket (bearer)
//!
//! # Content
//! GET   /api/reviews              - Google rating proxy with fallback
//! GET   /api/projects             - Up to 12 portfolio entries
//! GET   /api/services             - Static service catalog
//! ```

pub mod auth;
pub mod contact;
pub mod health;
pub mod projects;
pub mod quotes;
pub mod reviews;
pub mod services;
pub mod tickets;

use axum::{
    Router,
    routing::{get, patch, post},
};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

/// Body returned by every create endpoint: a message plus the new ID under
/// an entity-specific key.
#[derive(Debug, Serialize)]
pub struct Created<Id: Serialize> {
    pub message: &'static str,
    #[serde(flatten)]
    pub id: Id,
}

/// Trimmed value of a required text field.
///
/// # Errors
///
/// Returns `AppError::Validation` when the value is blank.
pub(crate) fn required(field: &str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(value.to_owned())
}

/// Trimmed optional text; blank becomes `None`.
pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
}

/// Create the quote routes router.
pub fn quote_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(quotes::create))
        .route("/user", get(quotes::list_for_user))
}

/// Create the ticket routes router.
pub fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(tickets::create))
        .route("/user", get(tickets::list_for_user))
        .route("/{ticket_id}", patch(tickets::update))
}

/// Create all `/api` routes.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .nest("/auth", auth_routes())
        .route("/contact", post(contact::submit))
        .nest("/quotes", quote_routes())
        .nest("/tickets", ticket_routes())
        .route("/reviews", get(reviews::summary))
        .route("/projects", get(projects::list))
        .route("/services", get(services::list));

    Router::new().nest("/api", api)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required("name", "  Alice ").unwrap(), "Alice");
        assert!(matches!(
            required("name", "   "),
            Err(AppError::Validation(ref msg)) if msg == "name must not be empty"
        ));
    }

    #[test]
    fn test_optional_blank_is_none() {
        assert_eq!(optional(Some(" +352 ")), Some("+352".to_owned()));
        assert_eq!(optional(Some("  ")), None);
        assert_eq!(optional(None), None);
    }

    #[test]
    fn test_created_flattens_id() {
        #[derive(Serialize)]
        struct QuoteRef {
            quote_id: &'static str,
        }

        let body = serde_json::to_value(Created {
            message: "Quote request submitted",
            id: QuoteRef {
                quote_id: "QT-1A2B3C4D",
            },
        })
        .unwrap();

        assert_eq!(
            body,
            serde_json::json!({"message": "Quote request submitted", "quote_id": "QT-1A2B3C4D"})
        );
    }
}
