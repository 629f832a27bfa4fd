//! Stripe Checkout Integration
//!
//! Hosted checkout: the donor is redirected to Stripe's payment page and
//! back to the app. Completion is reported through the webhook.

use async_trait::async_trait;
use stripe::{
    CheckoutSession as StripeCheckoutSession, CheckoutSessionMode, Client,
    CreateCheckoutSession, CreateCheckoutSessionLineItems,
    CreateCheckoutSessionLineItemsPriceData,
    CreateCheckoutSessionLineItemsPriceDataProductData,
    CreateCheckoutSessionPaymentMethodTypes, Currency, Webhook, WebhookError,
};

use super::{CheckoutRequest, CheckoutSession, PaymentProcessor};
use crate::error::{DonationError, Result};
use crate::webhook::WebhookEvent;

/// Stripe client wrapper
pub struct StripeClient {
    client: Client,
    webhook_secret: String,
}

impl StripeClient {
    /// Create a new Stripe client
    pub fn new(secret_key: &str, webhook_secret: &str) -> Self {
        Self {
            client: Client::new(secret_key),
            webhook_secret: webhook_secret.to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .map_err(|_| DonationError::Config("STRIPE_SECRET_KEY not set".into()))?;
        let webhook_secret = std::env::var("STRIPE_WEBHOOK_SECRET")
            .map_err(|_| DonationError::Config("STRIPE_WEBHOOK_SECRET not set".into()))?;

        Ok(Self::new(&secret_key, &webhook_secret))
    }
}

#[async_trait]
impl PaymentProcessor for StripeClient {
    async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<CheckoutSession> {
        let item = &request.line_item;

        let mut params = CreateCheckoutSession::new();
        params.success_url = Some(&request.success_url);
        params.cancel_url = Some(&request.cancel_url);
        params.mode = Some(CheckoutSessionMode::Payment);
        params.payment_method_types = Some(vec![CreateCheckoutSessionPaymentMethodTypes::Card]);
        params.metadata = Some(request.metadata.clone());

        // Donations are always collected in USD
        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            quantity: Some(item.quantity),
            price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                currency: Currency::USD,
                unit_amount: Some(item.amount),
                product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: item.name.clone(),
                    description: item.description.clone(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]);

        let session = StripeCheckoutSession::create(&self.client, params)
            .await
            .map_err(|e| DonationError::Stripe(e.to_string()))?;

        tracing::debug!(session_id = %session.id, amount = item.amount, "Stripe session created");

        Ok(CheckoutSession {
            id: session.id.to_string(),
            checkout_url: session.url,
        })
    }

    fn verify_webhook(&self, payload: &str, signature: &str) -> Result<WebhookEvent> {
        let event = Webhook::construct_event(payload, signature, &self.webhook_secret)
            .map_err(|e| match e {
                WebhookError::BadParse(e) => DonationError::InvalidPayload(e.to_string()),
                other => DonationError::InvalidSignature(other.to_string()),
            })?;

        WebhookEvent::from_stripe(&event)
    }
}
