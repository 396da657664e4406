//! Portfolio projects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use sparksonic_core::ProjectId;

/// A completed installation shown on the projects page.
///
/// The API only reads these; they are loaded with `sparksonic-cli seed projects`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: ProjectId,
    pub title: String,
    pub location: String,
    /// Completion date, `YYYY-MM-DD`.
    pub date: String,
    pub category: String,
    /// Image URL.
    pub image: String,
    pub description: String,
    /// Free-form facts such as system size or subsidy.
    #[serde(default)]
    pub details: Map<String, Value>,
}
