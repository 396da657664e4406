//! Contact form inquiries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sparksonic_core::{ContactId, ContactStatus, Email};

/// A stored contact form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub contact_id: ContactId,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub message: String,
    /// Service the sender asked about; `None` for a general inquiry.
    pub service: Option<String>,
    #[serde(default)]
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
