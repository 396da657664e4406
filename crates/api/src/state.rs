//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::DocumentStore;
use crate::services::auth::{TokenError, TokenService};
use crate::services::email::EmailService;
use crate::services::reviews::{ReviewsClient, UpstreamError};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("token service: {0}")]
    Token(#[from] TokenError),
    #[error("reviews client: {0}")]
    Reviews(#[from] UpstreamError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Everything a handler needs is
/// reached through it; there is no global state, so tests can supply an
/// in-memory store and a recording mailer.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    store: Arc<dyn DocumentStore>,
    tokens: TokenService,
    email: EmailService,
    reviews: ReviewsClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `store` - Document store backend
    /// * `email` - Notification service
    ///
    /// # Errors
    ///
    /// Returns an error if the signing key or HTTP client cannot be built.
    pub fn new(
        config: ApiConfig,
        store: Arc<dyn DocumentStore>,
        email: EmailService,
    ) -> Result<Self, StateError> {
        let tokens = TokenService::new(&config.auth)?;
        let reviews = ReviewsClient::new(&config.reviews)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                tokens,
                email,
                reviews,
            }),
        })
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// Get a reference to the email service.
    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }

    /// Get a reference to the reviews client.
    #[must_use]
    pub fn reviews(&self) -> &ReviewsClient {
        &self.inner.reviews
    }
}
