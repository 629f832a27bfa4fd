//! Donation Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, DonationError>;

/// Donation-related errors
#[derive(Error, Debug)]
pub enum DonationError {
    /// Request body missing, unparseable, or missing a required field
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Line item amount is not a usable number
    #[error("Unparseable amount: {0}")]
    UnparseableAmount(String),

    /// Referenced fundraiser does not exist
    #[error("Fundraiser not found: {0}")]
    FundraiserNotFound(String),

    /// Access token missing or rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Token was valid but no user record matches it
    #[error("No user for identity: {0}")]
    UserNotFound(String),

    /// Webhook body could not be decoded
    #[error("Webhook payload invalid: {0}")]
    InvalidPayload(String),

    /// Webhook signature verification failed
    #[error("Webhook signature invalid: {0}")]
    InvalidSignature(String),

    /// Completed session has no pending donation
    #[error("No donation for session: {0}")]
    NoDonationForSession(String),

    /// A donation already references this session
    #[error("Duplicate donation for session: {0}")]
    DuplicateSession(String),

    /// Stripe API error
    #[error("Stripe error: {0}")]
    Stripe(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DonationError {
    /// HTTP status this error is reported with
    pub fn status_code(&self) -> u16 {
        match self {
            DonationError::MalformedRequest(_)
            | DonationError::UnparseableAmount(_)
            | DonationError::InvalidPayload(_)
            | DonationError::InvalidSignature(_) => 400,
            DonationError::Unauthorized(_) | DonationError::UserNotFound(_) => 401,
            DonationError::FundraiserNotFound(_) => 404,
            DonationError::NoDonationForSession(_)
            | DonationError::DuplicateSession(_)
            | DonationError::Stripe(_)
            | DonationError::Config(_)
            | DonationError::Storage(_) => 500,
        }
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> &str {
        match self {
            DonationError::MalformedRequest(_) => "Malformed request data.",
            DonationError::UnparseableAmount(_) => "Couldn't parse donation amount.",
            DonationError::FundraiserNotFound(_) => "Fundraiser does not exist.",
            DonationError::Unauthorized(_) => "Missing or invalid access token.",
            DonationError::UserNotFound(_) => "Please log in before donating.",
            DonationError::InvalidPayload(_) => "Invalid payload.",
            DonationError::InvalidSignature(_) => "Invalid message signature.",
            DonationError::NoDonationForSession(_) => "No donation record for this session.",
            DonationError::Stripe(_) => "Payment processing failed. Please try again.",
            DonationError::Config(_) => "Service configuration error.",
            _ => "An error occurred processing your request.",
        }
    }

    /// Whether the client-facing body uses the `message` key instead of `error`
    fn uses_message_key(&self) -> bool {
        matches!(
            self,
            DonationError::FundraiserNotFound(_)
                | DonationError::Unauthorized(_)
                | DonationError::UserNotFound(_)
        )
    }

    /// JSON body sent to the client
    pub fn to_body(&self) -> serde_json::Value {
        let key = if self.uses_message_key() { "message" } else { "error" };
        let mut body = serde_json::Map::new();
        body.insert(key.to_string(), self.user_message().into());
        serde_json::Value::Object(body)
    }
}

#[cfg(feature = "axum-handlers")]
impl axum::response::IntoResponse for DonationError {
    fn into_response(self) -> axum::response::Response {
        let status = axum::http::StatusCode::from_u16(self.status_code())
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        (status, axum::Json(self.to_body())).into_response()
    }
}
