//! Account, bearer token and middleware tests.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::json;

use sparksonic_api::error::INVALID_TOKEN_DETAIL;
use sparksonic_integration_tests::{
    BUSINESS_INBOX, SITE_ORIGIN, TestApp, test_config, unconfigured_reviews,
};

#[tokio::test]
async fn health_reports_service() {
    let app = TestApp::new();

    let response = app.get("/api/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({"status": "healthy", "service": "Sparksonic API"})
    );

    let ready = app.get("/api/health/ready").await;
    assert_eq!(ready.status, StatusCode::OK);
    assert_eq!(ready.body["status"], "ready");
}

#[tokio::test]
async fn register_login_and_fetch_profile() {
    let app = TestApp::new();

    let customer_id = app.register("alice@example.com", "s3cret-pw").await;
    assert!(customer_id.starts_with("CUST-"));
    assert_eq!(customer_id.len(), "CUST-".len() + 8);

    let login = app
        .post(
            "/api/auth/login",
            json!({"email": "alice@example.com", "password": "s3cret-pw"}),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["token_type"], "bearer");
    assert_eq!(login.body["customer_id"], customer_id.as_str());
    assert_eq!(login.body["full_name"], "Test Customer");
    let token = login.body["access_token"].as_str().unwrap();

    let me = app.get_authed("/api/auth/me", token).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], "alice@example.com");
    assert_eq!(me.body["customer_id"], customer_id.as_str());
    assert_eq!(me.body["full_name"], "Test Customer");
    assert!(me.body.get("created_at").is_some());
    assert!(me.body.get("password_hash").is_none());
}

#[tokio::test]
async fn registration_response_shape() {
    let app = TestApp::new();

    let response = app
        .post(
            "/api/auth/register",
            json!({"email": "bob@example.com", "password": "hunter22", "full_name": "Bob"}),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Registration successful");
    assert!(response.body["customer_id"].is_string());
}

#[tokio::test]
async fn registration_sends_welcome_email() {
    let app = TestApp::new();
    app.register("carol@example.com", "hunter22").await;

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "carol@example.com");
    assert_eq!(sent[0].subject, "Welcome to Sparksonic");
    assert!(sent.iter().all(|m| m.to != BUSINESS_INBOX));
}

#[tokio::test]
async fn registration_succeeds_when_email_fails() {
    let app = TestApp::with_failing_mailer();

    let customer_id = app.register("dave@example.com", "hunter22").await;
    assert!(customer_id.starts_with("CUST-"));
    assert!(app.mailer.sent().is_empty());

    app.login("dave@example.com", "hunter22").await;
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = TestApp::new();
    app.register("erin@example.com", "hunter22").await;

    let response = app
        .post(
            "/api/auth/register",
            json!({"email": "Erin@Example.com", "password": "other-pw", "full_name": "Erin"}),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.detail(), "Email already registered");
}

#[tokio::test]
async fn emails_are_case_insensitive() {
    let app = TestApp::new();
    app.register("Frank@Example.COM", "hunter22").await;

    let token = app.login("frank@example.com", "hunter22").await;
    let me = app.get_authed("/api/auth/me", &token).await;
    assert_eq!(me.body["email"], "frank@example.com");
}

#[tokio::test]
async fn invalid_registration_input_is_422() {
    let app = TestApp::new();

    let bad_email = app
        .post(
            "/api/auth/register",
            json!({"email": "not-an-email", "password": "hunter22", "full_name": "X"}),
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::UNPROCESSABLE_ENTITY);

    let missing_name = app
        .post(
            "/api/auth/register",
            json!({"email": "x@example.com", "password": "hunter22"}),
        )
        .await;
    assert_eq!(missing_name.status, StatusCode::UNPROCESSABLE_ENTITY);

    let short_password = app
        .post(
            "/api/auth/register",
            json!({"email": "x@example.com", "password": "abc", "full_name": "X"}),
        )
        .await;
    assert_eq!(short_password.status, StatusCode::UNPROCESSABLE_ENTITY);

    let blank_name = app
        .post(
            "/api/auth/register",
            json!({"email": "x@example.com", "password": "hunter22", "full_name": "  "}),
        )
        .await;
    assert_eq!(blank_name.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(blank_name.detail(), "full_name must not be empty");
}

#[tokio::test]
async fn bad_credentials_are_401() {
    let app = TestApp::new();
    app.register("gina@example.com", "hunter22").await;

    for body in [
        json!({"email": "gina@example.com", "password": "wrong-pw"}),
        json!({"email": "nobody@example.com", "password": "hunter22"}),
    ] {
        let response = app.post("/api/auth/login", body).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.detail(), "Invalid credentials");
    }
}

#[tokio::test]
async fn token_failures_are_401_with_fixed_detail() {
    let app = TestApp::new();

    let missing = app.get("/api/auth/me").await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.detail(), INVALID_TOKEN_DETAIL);

    let garbled = app.get_authed("/api/auth/me", "not.a.token").await;
    assert_eq!(garbled.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbled.detail(), INVALID_TOKEN_DETAIL);

    let basic = app
        .send(
            Request::builder()
                .uri("/api/auth/me")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(basic.status, StatusCode::UNAUTHORIZED);
    assert_eq!(basic.detail(), INVALID_TOKEN_DETAIL);
}

#[tokio::test]
async fn expired_token_is_401() {
    let app = TestApp::new();
    app.register("hana@example.com", "hunter22").await;

    let claims_email = sparksonic_core::Email::parse("hana@example.com").unwrap();
    let customer_id = sparksonic_core::CustomerId::generate();
    let issued = chrono::Utc::now() - chrono::Duration::days(8);
    let token = app
        .state
        .tokens()
        .issue_at(&claims_email, &customer_id, issued)
        .unwrap();

    let response = app.get_authed("/api/auth/me", &token).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.detail(), INVALID_TOKEN_DETAIL);
}

#[tokio::test]
async fn token_for_vanished_user_is_404() {
    let app = TestApp::new();

    let ghost = sparksonic_core::Email::parse("ghost@example.com").unwrap();
    let token = app
        .state
        .tokens()
        .issue(&ghost, &sparksonic_core::CustomerId::generate())
        .unwrap();

    let response = app.get_authed("/api/auth/me", &token).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.detail(), "User not found");
}

#[tokio::test]
async fn request_id_is_echoed_or_generated() {
    let app = TestApp::new();

    let echoed = app
        .send(
            Request::builder()
                .uri("/api/health")
                .header("x-request-id", "edge-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(echoed.headers["x-request-id"], "edge-42");

    let generated = app.get("/api/health").await;
    let id = generated.headers["x-request-id"].to_str().unwrap();
    assert_eq!(id.len(), 36);
}

#[tokio::test]
async fn cors_allows_configured_origin_with_credentials() {
    let app = TestApp::new();

    let preflight = app
        .send(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/auth/login")
                .header(header::ORIGIN, SITE_ORIGIN)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(
        preflight.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        SITE_ORIGIN
    );
    assert_eq!(
        preflight.headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );

    let foreign = app
        .send(
            Request::builder()
                .uri("/api/health")
                .header(header::ORIGIN, "https://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert!(
        foreign
            .headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn wildcard_origin_is_skipped_instead_of_crashing() {
    let mut config = test_config(unconfigured_reviews());
    config.cors_origins = vec!["*".to_owned(), SITE_ORIGIN.to_owned()];
    let app = TestApp::with_config(config);

    let allowed = app
        .send(
            Request::builder()
                .uri("/api/health")
                .header(header::ORIGIN, SITE_ORIGIN)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(allowed.status, StatusCode::OK);
    assert_eq!(
        allowed.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        SITE_ORIGIN
    );

    let foreign = app
        .send(
            Request::builder()
                .uri("/api/health")
                .header(header::ORIGIN, "https://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert!(
        foreign
            .headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}
