//! Ratings summary returned by `GET /api/reviews`.

use serde::{Deserialize, Serialize};

/// A single public review.
///
/// Mirrors the upstream place-details review object; fields the upstream
/// omits are left out of the response as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub author_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_photo_url: Option<String>,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_time_description: Option<String>,
    #[serde(default)]
    pub text: String,
    /// Unix seconds.
    pub time: i64,
}

/// Aggregate rating with a handful of recent reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub rating: f64,
    pub total_reviews: u64,
    pub reviews: Vec<Review>,
}
