//! Integration tests for the Sparksonic API.
//!
//! Tests drive the real router in-process with `tower::ServiceExt::oneshot`,
//! backed by an in-memory store and a recording mailer. The ratings upstream
//! is faked with `httpmock`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sparksonic-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth` - Registration, login, bearer tokens, health and middleware
//! - `forms` - Contact, quotes, tickets and static content
//! - `reviews` - Ratings proxy and its fallback

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use chrono::Duration;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use sparksonic_api::config::{ApiConfig, AuthConfig, ReviewsConfig};
use sparksonic_api::db::MemoryStore;
use sparksonic_api::services::auth::TokenAlgorithm;
use sparksonic_api::services::email::{EmailService, RecordingMailer};
use sparksonic_api::state::AppState;

/// Signing secret shared by every test app.
pub const TEST_JWT_SECRET: &str = "k9Vq2mX7pLr4Tz8Wc1Hn6Bd3Fy5Gs0Ja";

/// Business inbox receiving notifications in tests.
pub const BUSINESS_INBOX: &str = "office@sparksonic.test";

/// Origin allowed by CORS in tests.
pub const SITE_ORIGIN: &str = "http://localhost:3000";

/// Places settings with no key, so reviews always fall back.
#[must_use]
pub fn unconfigured_reviews() -> ReviewsConfig {
    ReviewsConfig {
        base_url: "http://127.0.0.1:9".to_owned(),
        api_key: None,
        place_id: None,
    }
}

/// Places settings pointing at a mock server.
#[must_use]
pub fn mock_reviews(base_url: String) -> ReviewsConfig {
    ReviewsConfig {
        base_url,
        api_key: Some(SecretString::from("test-places-key")),
        place_id: Some("ChIJ-sparksonic".to_owned()),
    }
}

/// Configuration for an in-process app.
#[must_use]
pub fn test_config(reviews: ReviewsConfig) -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from("memory://"),
        host: [127, 0, 0, 1].into(),
        port: 0,
        cors_origins: vec![SITE_ORIGIN.to_owned()],
        auth: AuthConfig {
            jwt_secret: SecretString::from(TEST_JWT_SECRET),
            algorithm: TokenAlgorithm::Hs256,
            token_ttl: Duration::minutes(10_080),
        },
        email: None,
        reviews,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `detail` field of an error body.
    #[must_use]
    pub fn detail(&self) -> &str {
        self.body["detail"].as_str().unwrap_or_default()
    }
}

/// The API wired to in-memory collaborators.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: MemoryStore,
    pub mailer: RecordingMailer,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// App with a working mailer and no ratings upstream.
    #[must_use]
    pub fn new() -> Self {
        Self::build(test_config(unconfigured_reviews()), RecordingMailer::default())
    }

    /// App built from a hand-tuned configuration.
    #[must_use]
    pub fn with_config(config: ApiConfig) -> Self {
        Self::build(config, RecordingMailer::default())
    }

    /// App whose reviews client talks to `reviews`.
    #[must_use]
    pub fn with_reviews(reviews: ReviewsConfig) -> Self {
        Self::build(test_config(reviews), RecordingMailer::default())
    }

    /// App whose every email delivery fails.
    #[must_use]
    pub fn with_failing_mailer() -> Self {
        Self::build(test_config(unconfigured_reviews()), RecordingMailer::failing())
    }

    fn build(config: ApiConfig, mailer: RecordingMailer) -> Self {
        let store = MemoryStore::default();
        let email = EmailService::new(Arc::new(mailer.clone()), BUSINESS_INBOX);
        let state = AppState::new(config, Arc::new(store.clone()), email).unwrap();

        Self {
            router: sparksonic_api::app(state.clone()),
            state,
            store,
            mailer,
        }
    }

    /// Send a request built by hand.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Send `method uri` with an optional bearer token and JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn get_authed(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, None, Some(body)).await
    }

    pub async fn post_authed(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn patch_authed(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, Some(token), Some(body))
            .await
    }

    /// Register an account and return its customer ID.
    pub async fn register(&self, email: &str, password: &str) -> String {
        let response = self
            .post(
                "/api/auth/register",
                json!({
                    "email": email,
                    "password": password,
                    "full_name": "Test Customer",
                    "phone": "+352 621 000 000",
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["customer_id"].as_str().unwrap().to_owned()
    }

    /// Log in and return the access token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post(
                "/api/auth/login",
                json!({"email": email, "password": password}),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["access_token"].as_str().unwrap().to_owned()
    }

    /// Register `email` and return a token for it.
    pub async fn signed_in(&self, email: &str) -> String {
        self.register(email, "correct-horse").await;
        self.login(email, "correct-horse").await
    }
}
