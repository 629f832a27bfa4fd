//! Stripe Webhook Handling
//!
//! Finalizes pending donations when Stripe reports a completed checkout.

use std::sync::Arc;

use stripe::{Event, EventObject, EventType};

use crate::donation::{DonationId, DonationStore};
use crate::error::{DonationError, Result};
use crate::processor::PaymentProcessor;

/// Stripe event type for a paid checkout session
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Parsed webhook event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookEvent {
    /// Checkout completed - finalize the donation
    CheckoutCompleted { session_id: String },

    /// Anything else is acknowledged and ignored
    Other { event_type: String },
}

impl WebhookEvent {
    /// Build from an event type string and the id of the event's object
    pub fn from_parts(event_type: &str, object_id: String) -> Self {
        if event_type == CHECKOUT_SESSION_COMPLETED {
            WebhookEvent::CheckoutCompleted { session_id: object_id }
        } else {
            WebhookEvent::Other {
                event_type: event_type.to_string(),
            }
        }
    }

    /// Parse a verified Stripe event into our event type
    pub fn from_stripe(event: &Event) -> Result<Self> {
        match event.type_ {
            EventType::CheckoutSessionCompleted => {
                if let EventObject::CheckoutSession(session) = &event.data.object {
                    Ok(WebhookEvent::CheckoutCompleted {
                        session_id: session.id.to_string(),
                    })
                } else {
                    Err(DonationError::InvalidPayload(
                        "Invalid checkout session data".into(),
                    ))
                }
            }

            _ => Ok(WebhookEvent::Other {
                event_type: event.type_.to_string(),
            }),
        }
    }
}

/// What a webhook delivery did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The session's donation is now finalized
    Finalized {
        donation_id: DonationId,
        already_finalized: bool,
    },

    /// Event type we don't act on
    Ignored { event_type: String },
}

/// Confirms payments reported by the processor's webhook
pub struct PaymentConfirmer {
    store: Arc<dyn DonationStore>,
    processor: Arc<dyn PaymentProcessor>,
}

impl PaymentConfirmer {
    pub fn new(store: Arc<dyn DonationStore>, processor: Arc<dyn PaymentProcessor>) -> Self {
        Self { store, processor }
    }

    /// Verify a webhook delivery and apply it
    ///
    /// A missing signature header is handled as a bad signature.
    pub async fn confirm(&self, payload: &str, signature: Option<&str>) -> Result<ConfirmOutcome> {
        let event = self
            .processor
            .verify_webhook(payload, signature.unwrap_or_default())
            .inspect_err(|e| {
                if let DonationError::InvalidSignature(reason) = e {
                    tracing::error!(reason = %reason, "Stripe signature error");
                }
            })?;

        self.handle(event).await
    }

    /// Apply an already verified event
    pub async fn handle(&self, event: WebhookEvent) -> Result<ConfirmOutcome> {
        tracing::info!(event = ?event, "Processing Stripe webhook");

        match event {
            WebhookEvent::CheckoutCompleted { session_id } => {
                let mut donation = self
                    .store
                    .find_by_session(&session_id)
                    .await?
                    .ok_or_else(|| DonationError::NoDonationForSession(session_id.clone()))?;

                let already_finalized = donation.payment_finalized;
                if already_finalized {
                    tracing::debug!(session_id = %session_id, "Donation already finalized, replay");
                }

                donation.finalize();
                self.store.save(&donation).await?;

                tracing::info!(
                    donation_id = %donation.id,
                    session_id = %session_id,
                    amount = donation.amount,
                    "Donation finalized"
                );

                Ok(ConfirmOutcome::Finalized {
                    donation_id: donation.id,
                    already_finalized,
                })
            }

            WebhookEvent::Other { event_type } => {
                tracing::debug!(event_type = %event_type, "Unhandled webhook event");
                Ok(ConfirmOutcome::Ignored { event_type })
            }
        }
    }
}
