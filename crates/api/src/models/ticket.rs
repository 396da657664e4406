//! Support ticket records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sparksonic_core::{CustomerId, Email, TicketId, TicketPriority, TicketStatus};

/// A support ticket opened by an authenticated customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: TicketId,
    pub customer_id: CustomerId,
    /// Owner key; tickets are listed and updated by this email.
    pub customer_email: Email,
    pub subject: String,
    pub description: String,
    #[serde(default)]
    pub priority: TicketPriority,
    #[serde(default)]
    pub status: TicketStatus,
    /// Staff reply, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update applied by `PATCH /api/tickets/{ticket_id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TicketUpdate {
    pub status: Option<TicketStatus>,
    pub response: Option<String>,
}

impl TicketUpdate {
    /// Whether the update would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.response.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_update_requires_a_field() {
        let update: TicketUpdate = serde_json::from_str("{}").unwrap();
        assert!(update.is_empty());

        let update: TicketUpdate = serde_json::from_str(r#"{"status": "resolved"}"#).unwrap();
        assert!(!update.is_empty());
        assert_eq!(update.status, Some(TicketStatus::Resolved));
    }

    #[test]
    fn test_update_rejects_unknown_status() {
        assert!(serde_json::from_str::<TicketUpdate>(r#"{"status": "done"}"#).is_err());
        assert!(serde_json::from_str::<TicketUpdate>(r#"{"owner": "x"}"#).is_err());
    }
}
