//! Contact form route handler.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sparksonic_core::{ContactId, ContactStatus, Email};

use super::{Created, optional, required};
use crate::db::contacts::ContactRepository;
use crate::error::{ApiJson, Result};
use crate::models::Contact;
use crate::state::AppState;

/// Contact form data.
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
    #[serde(default)]
    pub service: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContactRef {
    pub contact_id: ContactId,
}

/// Store an inquiry, then notify the business and the sender.
///
/// POST /api/contact
#[instrument(skip_all, fields(email = %form.email))]
pub async fn submit(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<ContactRequest>,
) -> Result<Json<Created<ContactRef>>> {
    let now = Utc::now();
    let contact = Contact {
        contact_id: ContactId::generate(),
        name: required("name", &form.name)?,
        email: form.email,
        phone: optional(form.phone.as_deref()),
        message: required("message", &form.message)?,
        service: optional(form.service.as_deref()),
        status: ContactStatus::New,
        created_at: now,
        updated_at: now,
    };

    ContactRepository::new(state.store())
        .create(&contact)
        .await?;

    tracing::info!(contact_id = %contact.contact_id, "Contact form stored");

    let email = state.email();
    tokio::join!(
        email.notify_contact(&contact),
        email.confirm_contact(&contact)
    );

    Ok(Json(Created {
        message: "Contact form submitted successfully",
        id: ContactRef {
            contact_id: contact.contact_id,
        },
    }))
}
