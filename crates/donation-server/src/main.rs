//! Donation HTTP Server
//!
//! Axum-based server for donation checkout sessions and Stripe payment
//! confirmation webhooks.

mod auth;
mod config;
mod handlers;
mod routes;
mod state;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use donation_payments::{MemoryDonationStore, StripeClient};

use crate::auth::TokenVerifier;
use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Payments are required; fail fast without them
    let stripe = StripeClient::from_env().inspect_err(|_| {
        tracing::error!("Set STRIPE_SECRET_KEY and STRIPE_WEBHOOK_SECRET in .env");
    })?;
    tracing::info!("✓ Stripe configured");

    // TODO: swap in a database-backed DonationStore; records are lost on restart
    let store = Arc::new(MemoryDonationStore::new());
    tracing::warn!("Using in-memory donation store");

    let state = AppState::new(
        store,
        Arc::new(stripe),
        TokenVerifier::new(&config.jwt_secret),
        &config.app_url,
    );

    let app = routes::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("donation-server running on http://{}", config.bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health            - Health check");
    tracing::info!("  POST /make_session      - Create Stripe checkout");
    tracing::info!("  POST /donations/confirm - Stripe webhook");

    axum::serve(listener, app).await?;

    Ok(())
}
