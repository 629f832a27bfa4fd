//! Application State

use std::sync::Arc;

use donation_payments::{DonationStore, PaymentConfirmer, PaymentProcessor, SessionInitiator};

use crate::auth::TokenVerifier;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Starts donations (`POST /make_session`)
    pub initiator: Arc<SessionInitiator>,

    /// Applies Stripe webhooks (`POST /donations/confirm`)
    pub confirmer: Arc<PaymentConfirmer>,

    /// Access token verification
    pub tokens: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DonationStore>,
        processor: Arc<dyn PaymentProcessor>,
        tokens: TokenVerifier,
        app_url: &str,
    ) -> Self {
        Self {
            initiator: Arc::new(SessionInitiator::new(
                store.clone(),
                processor.clone(),
                app_url,
            )),
            confirmer: Arc::new(PaymentConfirmer::new(store, processor)),
            tokens: Arc::new(tokens),
        }
    }
}
