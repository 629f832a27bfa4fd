//! Mock Payment Processor
//!
//! For testing. Hands out sequential session ids and accepts webhooks whose
//! signature header equals the configured secret.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::Deserialize;

use super::{CheckoutRequest, CheckoutSession, PaymentProcessor};
use crate::error::{DonationError, Result};
use crate::webhook::WebhookEvent;

/// Mock processor that records every checkout request
pub struct MockPaymentProcessor {
    webhook_secret: String,
    requests: Mutex<Vec<CheckoutRequest>>,
    fail_checkout: AtomicBool,
}

#[derive(Deserialize)]
struct MockEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: MockEventData,
}

#[derive(Deserialize)]
struct MockEventData {
    object: MockEventObject,
}

#[derive(Deserialize)]
struct MockEventObject {
    id: String,
}

impl MockPaymentProcessor {
    pub fn new(webhook_secret: impl Into<String>) -> Self {
        Self {
            webhook_secret: webhook_secret.into(),
            requests: Mutex::new(Vec::new()),
            fail_checkout: AtomicBool::new(false),
        }
    }

    /// Make every following session creation fail
    pub fn fail_checkout(&self, fail: bool) {
        self.fail_checkout.store(fail, Ordering::SeqCst);
    }

    /// Checkout requests received so far
    pub fn requests(&self) -> Vec<CheckoutRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Build a webhook body the mock will accept
    pub fn event_payload(event_type: &str, object_id: &str) -> String {
        serde_json::json!({
            "type": event_type,
            "data": { "object": { "id": object_id } },
        })
        .to_string()
    }
}

#[async_trait]
impl PaymentProcessor for MockPaymentProcessor {
    async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<CheckoutSession> {
        if self.fail_checkout.load(Ordering::SeqCst) {
            return Err(DonationError::Stripe("mock checkout failure".into()));
        }

        let mut requests = self
            .requests
            .lock()
            .map_err(|e| DonationError::Stripe(e.to_string()))?;
        requests.push(request);

        let id = format!("cs_test_{}", requests.len());
        Ok(CheckoutSession {
            checkout_url: Some(format!("https://checkout.stripe.test/pay/{id}")),
            id,
        })
    }

    fn verify_webhook(&self, payload: &str, signature: &str) -> Result<WebhookEvent> {
        if signature != self.webhook_secret {
            return Err(DonationError::InvalidSignature("signature mismatch".into()));
        }

        let event: MockEvent = serde_json::from_str(payload)
            .map_err(|e| DonationError::InvalidPayload(e.to_string()))?;

        Ok(WebhookEvent::from_parts(&event.event_type, event.data.object.id))
    }
}
