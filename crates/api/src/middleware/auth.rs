//! Bearer token extractors.
//!
//! Provides extractors for requiring customer authentication in route handlers.
//! Every failure (missing header, wrong scheme, bad signature, expiry) is the
//! same 401 to the client; the specific [`TokenError`] is only logged.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::Span;

use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::services::auth::{AccessClaims, AuthError, AuthService, TokenError};
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAuth(claims): RequireAuth) -> String {
///     format!("Hello, {}!", claims.sub)
/// }
/// ```
#[derive(Debug)]
pub struct RequireAuth(pub AccessClaims);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).map_err(AuthError::from)?;
        let claims = state.tokens().verify(token).map_err(AuthError::from)?;

        Span::current().record("customer_id", claims.customer_id.as_str());
        set_sentry_user(&claims.customer_id, Some(&claims.sub));

        Ok(Self(claims))
    }
}

/// Extractor that resolves the bearer token to the stored user.
///
/// Rejects with 401 for token problems and 404 when the token is valid but
/// the account no longer exists.
#[derive(Debug)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(claims) = RequireAuth::from_request_parts(parts, state).await?;
        let user = AuthService::new(state.store(), state.tokens())
            .current_user(&claims)
            .await?;

        Ok(Self(user))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Result<&str, TokenError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(TokenError::Missing)?
        .to_str()
        .map_err(|_| TokenError::Malformed("non-ASCII authorization header".to_string()))?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or_else(|| TokenError::Malformed("expected '<scheme> <token>'".to_string()))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(TokenError::Malformed(format!("unsupported scheme {scheme}")));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(TokenError::Missing);
    }

    Ok(token)
}
