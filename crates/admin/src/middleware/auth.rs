//! API token authentication.
//!
//! Every `/api` handler takes [`RequireApiToken`], which checks the
//! `Authorization: Bearer <token>` header against `ADMIN_API_TOKEN`.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use brightwire_core::security::constant_time_eq;
use secrecy::ExposeSecret;

use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(_auth: RequireApiToken) -> &'static str {
///     "ok"
/// }
/// ```
pub struct RequireApiToken;

impl FromRequestParts<AppState> for RequireApiToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(AppError::Unauthorized)?;

        if constant_time_eq(token, state.config().api_token.expose_secret()) {
            Ok(Self)
        } else {
            tracing::warn!(path = %parts.uri.path(), "rejected admin API token");
            Err(AppError::Unauthorized)
        }
    }
}
