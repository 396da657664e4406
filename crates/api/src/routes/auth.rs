//! Account route handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sparksonic_core::{CustomerId, Email};

use super::{Created, optional, required};
use crate::error::{ApiJson, Result, add_breadcrumb};
use crate::middleware::CurrentUser;
use crate::models::UserProfile;
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Email,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Email,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct CustomerRef {
    pub customer_id: CustomerId,
}

/// Token issued on login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub customer_id: CustomerId,
    pub full_name: String,
}

/// Create an account.
///
/// POST /api/auth/register
#[instrument(skip_all, fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<RegisterRequest>,
) -> Result<Json<Created<CustomerRef>>> {
    let full_name = required("full_name", &form.full_name)?;
    let phone = optional(form.phone.as_deref());

    let user = AuthService::new(state.store(), state.tokens())
        .register(Registration {
            email: &form.email,
            password: &form.password,
            full_name: &full_name,
            phone: phone.as_deref(),
        })
        .await?;

    tracing::info!(customer_id = %user.customer_id, "User registered");
    add_breadcrumb(
        "auth",
        "User registered",
        Some(&[("customer_id", user.customer_id.as_str())]),
    );

    state.email().send_welcome(&user).await;

    Ok(Json(Created {
        message: "Registration successful",
        id: CustomerRef {
            customer_id: user.customer_id,
        },
    }))
}

/// Exchange credentials for a bearer token.
///
/// POST /api/auth/login
#[instrument(skip_all, fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let session = AuthService::new(state.store(), state.tokens())
        .login(&form.email, &form.password)
        .await
        .inspect_err(|e| tracing::info!(error = %e, "Login rejected"))?;

    tracing::info!(customer_id = %session.user.customer_id, "User logged in");

    Ok(Json(LoginResponse {
        access_token: session.access_token,
        token_type: "bearer",
        customer_id: session.user.customer_id,
        full_name: session.user.full_name,
    }))
}

/// The caller's profile, without the password hash.
///
/// GET /api/auth/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserProfile> {
    Json(UserProfile::from(user))
}
