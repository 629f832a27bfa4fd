//! Donation Checkout
//!
//! Validates a donation request, opens a Stripe checkout session for it and
//! records the donation as pending until the webhook confirms payment.

use std::sync::Arc;

use serde_json::Value;

use crate::donation::{Donation, DonationStore, FundraiserId, NewDonation};
use crate::error::{DonationError, Result};
use crate::line_item::LineItem;
use crate::processor::{CheckoutRequest, PaymentProcessor};

/// A pending donation and the checkout session paying for it
#[derive(Clone, Debug)]
pub struct StartedDonation {
    pub session_id: String,
    pub checkout_url: Option<String>,
    pub donation: Donation,
}

/// Starts donations for authenticated users
pub struct SessionInitiator {
    store: Arc<dyn DonationStore>,
    processor: Arc<dyn PaymentProcessor>,
    app_url: String,
}

impl SessionInitiator {
    pub fn new(
        store: Arc<dyn DonationStore>,
        processor: Arc<dyn PaymentProcessor>,
        app_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            processor,
            app_url: app_url.into(),
        }
    }

    /// Start a donation from a raw request body
    ///
    /// `identity` is the email carried by the caller's access token. Every
    /// validation failure returns before Stripe is called or anything is
    /// stored.
    pub async fn start(&self, body: &[u8], identity: &str) -> Result<StartedDonation> {
        let body: Value = serde_json::from_slice(body)
            .map_err(|e| DonationError::MalformedRequest(e.to_string()))?;

        let line_item = match body.get("line_item") {
            Some(Value::Object(raw)) if !raw.is_empty() => LineItem::from_json(raw)?,
            _ => return Err(DonationError::MalformedRequest("line_item missing".into())),
        };

        let fundraiser_id = match body.get("fundraiser_id") {
            Some(raw) if !is_blank(raw) => FundraiserId::from_json(raw)
                .ok_or_else(|| DonationError::FundraiserNotFound(raw.to_string()))?,
            _ => return Err(DonationError::MalformedRequest("fundraiser_id missing".into())),
        };

        let fundraiser = self
            .store
            .find_fundraiser(fundraiser_id)
            .await?
            .ok_or_else(|| DonationError::FundraiserNotFound(fundraiser_id.to_string()))?;

        let user = self
            .store
            .find_user_by_email(identity)
            .await?
            .ok_or_else(|| DonationError::UserNotFound(identity.to_string()))?;

        let amount = line_item.amount;
        let request = CheckoutRequest::new(line_item, &self.app_url)
            .with_metadata("fundraiser_id", fundraiser.id)
            .with_metadata("user_id", user.id);

        let session = self.processor.create_checkout_session(request).await?;

        tracing::info!(
            session_id = %session.id,
            fundraiser_id = %fundraiser.id,
            user_id = %user.id,
            amount,
            "Checkout session created"
        );

        let donation = self
            .store
            .create_donation(NewDonation {
                amount,
                fundraiser_id: fundraiser.id,
                user_id: user.id,
                stripe_session: session.id.clone(),
            })
            .await
            .inspect_err(|e| {
                tracing::error!(
                    session_id = %session.id,
                    error = %e,
                    "Checkout session has no donation record"
                );
            })?;

        tracing::info!(donation_id = %donation.id, "Pending donation recorded");

        Ok(StartedDonation {
            session_id: session.id,
            checkout_url: session.checkout_url,
            donation,
        })
    }
}

/// Null, zero, false and empty values count as absent
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
