//! Payment Processor Integration
//!
//! The processor hosts the checkout page and reports completed payments back
//! through signed webhooks.

mod mock;
mod stripe_checkout;

pub use self::mock::MockPaymentProcessor;
pub use self::stripe_checkout::StripeClient;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::line_item::LineItem;
use crate::webhook::WebhookEvent;

/// Placeholder Stripe replaces with the session id in redirect URLs
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Payment processor trait
///
/// Implemented by [`StripeClient`] in production and [`MockPaymentProcessor`]
/// in tests.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create a hosted checkout session for one line item
    async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<CheckoutSession>;

    /// Verify a webhook signature and decode the event
    fn verify_webhook(&self, payload: &str, signature: &str) -> Result<WebhookEvent>;
}

/// Request to create a checkout session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Item being paid for
    pub line_item: LineItem,

    /// URL to redirect after successful payment
    pub success_url: String,

    /// URL to redirect if checkout is cancelled
    pub cancel_url: String,

    /// Attached to the session for tracking
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutRequest {
    /// Build a request redirecting back to the donate pages of `app_url`
    pub fn new(line_item: LineItem, app_url: &str) -> Self {
        let app_url = app_url.trim_end_matches('/');

        Self {
            line_item,
            success_url: format!("{app_url}/donate/success?session_id={SESSION_ID_PLACEHOLDER}"),
            cancel_url: format!("{app_url}/donate/cancel?session_id={SESSION_ID_PLACEHOLDER}"),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.metadata.insert(key.into(), value.to_string());
        self
    }
}

/// Result of creating a checkout session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Processor session ID
    pub id: String,

    /// Hosted checkout page, when the processor returns one
    pub checkout_url: Option<String>,
}
