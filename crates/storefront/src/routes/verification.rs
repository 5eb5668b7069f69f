//! Verification token route handlers.

use axum::{Json, extract::State, http::StatusCode};
use brightwire_core::{Email, VerificationPurpose, VerificationStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// Request a verification code.
#[derive(Debug, Deserialize)]
pub struct VerificationRequest {
    pub email: Email,
    #[serde(default)]
    pub purpose: VerificationPurpose,
}

/// Issued token. The code itself only travels by email.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationTicket {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Confirm a verification code.
#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub token: String,
    pub code: String,
}

/// Confirmation result.
#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub status: VerificationStatus,
    pub email: Email,
    pub purpose: VerificationPurpose,
}

/// Issue a token and email its code.
#[instrument(skip(state, request), fields(purpose = ?request.purpose))]
pub async fn request_code(
    State(state): State<AppState>,
    Json(request): Json<VerificationRequest>,
) -> Result<(StatusCode, Json<VerificationTicket>)> {
    let issued = state
        .verification()
        .issue(request.email.clone(), request.purpose)
        .await;

    match state.email() {
        Some(email) => {
            email
                .send_verification_code(request.email.as_str(), &issued.code, request.purpose)
                .await?;
        }
        None => {
            tracing::warn!(
                purpose = ?request.purpose,
                "verification code issued but SMTP is not configured"
            );
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(VerificationTicket {
            token: issued.token,
            expires_at: issued.expires_at,
        }),
    ))
}

/// Check a code against its token.
#[instrument(skip(state, request))]
pub async fn confirm_code(
    State(state): State<AppState>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>> {
    let record = state
        .verification()
        .verify(&request.token, &request.code)
        .await?;

    tracing::info!(purpose = ?record.purpose, "verification confirmed");
    Ok(Json(ConfirmResponse {
        status: record.status,
        email: record.email,
        purpose: record.purpose,
    }))
}
