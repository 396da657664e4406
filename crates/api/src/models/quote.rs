//! Quote request records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sparksonic_core::{Email, QuoteId, QuoteStatus};

/// An anonymous service quote request.
///
/// Linked to a customer only through `email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub quote_id: QuoteId,
    pub service: String,
    pub description: String,
    pub location: String,
    /// Free-form date as entered on the site.
    pub preferred_date: Option<String>,
    pub phone: String,
    pub email: Email,
    #[serde(default)]
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
