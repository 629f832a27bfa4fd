//! Access Token Verification
//!
//! Callers authenticate with `Authorization: Bearer <jwt>`. The token's
//! `sub` claim is the user's email.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use donation_payments::DonationError;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Claims carried by access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
}

/// Verifies HS256 access tokens
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Return the identity of a valid token
    pub fn verify(&self, token: &str) -> Result<String, DonationError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims.sub)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {}", e);
                DonationError::Unauthorized(e.to_string())
            })
    }
}

/// Email of the authenticated caller
#[derive(Debug, Clone)]
pub struct Identity(pub String);

impl FromRequestParts<AppState> for Identity {
    type Rejection = DonationError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(|| DonationError::Unauthorized("missing bearer token".into()))?;

        state.tokens.verify(token).map(Identity)
    }
}

/// Sign a token for `email` valid for an hour
#[cfg(test)]
pub fn token_for(secret: &str, email: &str) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let claims = Claims {
        sub: email.to_string(),
        exp: jsonwebtoken::get_current_timestamp() + 3600,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
}
