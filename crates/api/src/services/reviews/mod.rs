//! Google Places ratings proxy.
//!
//! Fetches the business listing's rating and the first few reviews. Any
//! failure (not configured, network, timeout, non-`OK` status) yields a
//! fixed fallback summary so the site always has something to render.

pub mod fixtures;

use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::ReviewsConfig;
use crate::models::{Review, ReviewSummary};

/// Total time allowed for one upstream request.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Reviews included in a summary.
pub const MAX_REVIEWS: usize = 5;

const DETAILS_PATH: &str = "/maps/api/place/details/json";
const DETAILS_FIELDS: &str = "name,rating,reviews,user_ratings_total";

/// Why the upstream answer was not used.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// API key or place ID is not configured.
    #[error("reviews upstream not configured")]
    NotConfigured,

    /// HTTP request failed or timed out.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a status other than `OK`.
    #[error("upstream status {status}: {message}")]
    Status { status: String, message: String },

    /// Base URL is not a valid URL.
    #[error("invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Result of a reviews lookup.
#[derive(Debug)]
pub enum ReviewsOutcome {
    /// Live data from the upstream API.
    Upstream(ReviewSummary),
    /// Fixed data substituted because the upstream failed.
    Fallback {
        summary: ReviewSummary,
        reason: UpstreamError,
    },
}

impl ReviewsOutcome {
    /// The summary to return to clients, whichever source it came from.
    #[must_use]
    pub fn into_summary(self) -> ReviewSummary {
        match self {
            Self::Upstream(summary) | Self::Fallback { summary, .. } => summary,
        }
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// The summary served when the upstream is unavailable.
#[must_use]
pub fn fallback_summary(now: DateTime<Utc>) -> ReviewSummary {
    ReviewSummary {
        rating: 5.0,
        total_reviews: 48,
        reviews: vec![Review {
            author_name: "John Smith".to_owned(),
            author_url: None,
            language: None,
            profile_photo_url: None,
            rating: 5,
            relative_time_description: None,
            text: "Excellent service! Professional team and quality work.".to_owned(),
            time: now.timestamp(),
        }],
    }
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: Option<PlaceDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct PlaceDetails {
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    user_ratings_total: Option<u64>,
    #[serde(default)]
    reviews: Vec<Review>,
}

/// Client for the place-details endpoint.
#[derive(Clone)]
pub struct ReviewsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    place_id: Option<String>,
}

impl std::fmt::Debug for ReviewsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewsClient")
            .field("base_url", &self.base_url)
            .field("configured", &self.is_configured())
            .finish_non_exhaustive()
    }
}

impl ReviewsClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ReviewsConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            place_id: config.place_id.clone(),
        })
    }

    /// Whether both the API key and place ID are set.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.place_id.is_some()
    }

    /// Fetch the summary, falling back to fixed data on any failure.
    pub async fn fetch(&self) -> ReviewsOutcome {
        match self.fetch_upstream().await {
            Ok(summary) => ReviewsOutcome::Upstream(summary),
            Err(reason) => {
                if matches!(reason, UpstreamError::NotConfigured) {
                    tracing::debug!("Reviews upstream not configured; serving fallback");
                } else {
                    tracing::warn!(error = %reason, "Reviews upstream failed; serving fallback");
                    sentry::add_breadcrumb(sentry::Breadcrumb {
                        category: Some("reviews".to_owned()),
                        message: Some(reason.to_string()),
                        level: sentry::Level::Warning,
                        ..Default::default()
                    });
                }
                ReviewsOutcome::Fallback {
                    summary: fallback_summary(Utc::now()),
                    reason,
                }
            }
        }
    }

    async fn fetch_upstream(&self) -> Result<ReviewSummary, UpstreamError> {
        let (Some(api_key), Some(place_id)) = (&self.api_key, &self.place_id) else {
            return Err(UpstreamError::NotConfigured);
        };

        let url = self.details_url(place_id, api_key)?;
        let response: DetailsResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.status != "OK" {
            return Err(UpstreamError::Status {
                status: response.status,
                message: response.error_message.unwrap_or_default(),
            });
        }

        let details = response.result.unwrap_or_default();
        let mut reviews = details.reviews;
        reviews.truncate(MAX_REVIEWS);

        Ok(ReviewSummary {
            rating: details.rating.unwrap_or(5.0),
            total_reviews: details.user_ratings_total.unwrap_or(0),
            reviews,
        })
    }

    fn details_url(&self, place_id: &str, api_key: &SecretString) -> Result<Url, UpstreamError> {
        let mut url = Url::parse(&self.base_url)?.join(DETAILS_PATH)?;
        url.query_pairs_mut()
            .append_pair("place_id", place_id)
            .append_pair("fields", DETAILS_FIELDS)
            .append_pair("key", api_key.expose_secret());
        Ok(url)
    }
}
