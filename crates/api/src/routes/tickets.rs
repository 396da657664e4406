//! Support ticket route handlers. All require a bearer token.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sparksonic_core::{TicketId, TicketPriority, TicketStatus};

use super::{Created, required};
use crate::db::tickets::TicketRepository;
use crate::error::{ApiJson, AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{Ticket, TicketUpdate};
use crate::state::AppState;

/// New ticket form data.
#[derive(Debug, Deserialize)]
pub struct TicketRequest {
    pub subject: String,
    pub description: String,
    #[serde(default)]
    pub priority: TicketPriority,
}

#[derive(Debug, Serialize)]
pub struct TicketRef {
    pub ticket_id: TicketId,
}

/// Open a ticket for the caller and notify the business.
///
/// POST /api/tickets
#[instrument(skip_all, fields(customer_id = %user.customer_id))]
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(form): ApiJson<TicketRequest>,
) -> Result<Json<Created<TicketRef>>> {
    let now = Utc::now();
    let ticket = Ticket {
        ticket_id: TicketId::generate(),
        customer_id: user.customer_id.clone(),
        customer_email: user.email.clone(),
        subject: required("subject", &form.subject)?,
        description: required("description", &form.description)?,
        priority: form.priority,
        status: TicketStatus::Open,
        response: None,
        created_at: now,
        updated_at: now,
    };

    TicketRepository::new(state.store()).create(&ticket).await?;

    tracing::info!(ticket_id = %ticket.ticket_id, priority = %ticket.priority, "Ticket opened");

    state.email().notify_ticket(&ticket, &user).await;

    Ok(Json(Created {
        message: "Ticket created",
        id: TicketRef {
            ticket_id: ticket.ticket_id,
        },
    }))
}

/// The caller's tickets.
///
/// GET /api/tickets/user
pub async fn list_for_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Ticket>>> {
    let tickets = TicketRepository::new(state.store())
        .list_by_customer_email(&user.email)
        .await?;

    Ok(Json(tickets))
}

/// Update status and/or response of one of the caller's tickets.
///
/// PATCH /api/tickets/{ticket_id}
#[instrument(skip_all, fields(customer_id = %user.customer_id, ticket_id = %ticket_id))]
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(ticket_id): Path<String>,
    ApiJson(update): ApiJson<TicketUpdate>,
) -> Result<Json<Created<TicketRef>>> {
    let not_found = || AppError::NotFound("Ticket not found".to_string());

    let ticket_id = TicketId::parse(&ticket_id).map_err(|_| not_found())?;

    if update.is_empty() {
        return Err(AppError::Validation(
            "at least one of status or response is required".to_string(),
        ));
    }

    let updated = TicketRepository::new(state.store())
        .update_for_owner(&ticket_id, &user.email, &update, Utc::now())
        .await?;

    if !updated {
        return Err(not_found());
    }

    tracing::info!(status = ?update.status, "Ticket updated");

    Ok(Json(Created {
        message: "Ticket updated",
        id: TicketRef { ticket_id },
    }))
}
