//! HTTP Handlers

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Serialize;

use donation_payments::DonationError;

use crate::auth::Identity;
use crate::state::AppState;

/// Header Stripe signs webhook deliveries with
pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Open a checkout session and record the pending donation
pub async fn make_session(
    State(state): State<AppState>,
    Identity(email): Identity,
    body: Bytes,
) -> Result<(StatusCode, Json<SessionResponse>), DonationError> {
    let started = state.initiator.start(&body, &email).await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id: started.session_id,
        }),
    ))
}

/// Stripe webhook handler
///
/// Stripe only looks at the status code.
pub async fn confirm_donation(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MessageResponse>, DonationError> {
    let payload =
        std::str::from_utf8(&body).map_err(|e| DonationError::InvalidPayload(e.to_string()))?;

    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    state.confirmer.confirm(payload, signature).await?;

    Ok(Json(MessageResponse { message: "OK" }))
}
