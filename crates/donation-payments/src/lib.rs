//! # donation-payments
//!
//! Donation checkout and payment confirmation for the fundraising app.
//!
//! ## Flow
//!
//! Donations go through Stripe Checkout (Hosted). Nothing card-related ever
//! touches this service.
//!
//! ```text
//! ┌─────────────┐  make_session   ┌─────────────────┐  redirect   ┌─────────────┐
//! │  Donor      │────────────────▶│  Stripe Hosted  │────────────▶│  App        │
//! │  (browser)  │  pending row    │  Checkout Page  │             │  /donate/.. │
//! └─────────────┘                 └────────┬────────┘             └─────────────┘
//!                                          │ checkout.session.completed
//!                                          ▼
//!                                 ┌─────────────────┐
//!                                 │ /donations/     │  payment_finalized = true
//!                                 │ confirm         │
//!                                 └─────────────────┘
//! ```
//!
//! A donation is created pending (`payment_finalized = false`) when the
//! session is opened and finalized exactly when Stripe reports the session
//! as completed. Replayed webhooks leave it finalized.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use donation_payments::{MemoryDonationStore, SessionInitiator, StripeClient};
//!
//! let store = Arc::new(MemoryDonationStore::new());
//! let stripe = Arc::new(StripeClient::new("sk_test_xxx", "whsec_xxx"));
//! let initiator = SessionInitiator::new(store, stripe, "https://yoursite.com");
//!
//! let started = initiator
//!     .start(br#"{"line_item": {"amount": "25"}, "fundraiser_id": 1}"#, "donor@example.com")
//!     .await?;
//!
//! // Hand started.session_id to Stripe.js redirectToCheckout
//! ```

mod donation;
mod error;
mod initiator;
mod line_item;
mod processor;
mod webhook;

pub use donation::{
    Donation, DonationId, DonationStore, Fundraiser, FundraiserId, MemoryDonationStore,
    NewDonation, User, UserId,
};
pub use error::{DonationError, Result};
pub use initiator::{SessionInitiator, StartedDonation};
pub use line_item::{DEFAULT_ITEM_NAME, LineItem, parse_amount, to_minor_units};
pub use processor::{
    CheckoutRequest, CheckoutSession, MockPaymentProcessor, PaymentProcessor,
    SESSION_ID_PLACEHOLDER, StripeClient,
};
pub use webhook::{CHECKOUT_SESSION_COMPLETED, ConfirmOutcome, PaymentConfirmer, WebhookEvent};
