//! Router

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{confirm_donation, health_check, make_session};
use crate::state::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    // The browser client lives on a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/make_session", post(make_session))
        .route("/donations/confirm", post(confirm_donation))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{TokenVerifier, token_for};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use donation_payments::{
        CHECKOUT_SESSION_COMPLETED, Fundraiser, FundraiserId, MemoryDonationStore,
        MockPaymentProcessor, User, UserId,
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    const JWT_SECRET: &str = "jwt-test-secret";
    const WEBHOOK_SECRET: &str = "whsec_mock";
    const DONOR: &str = "ada@example.com";

    struct TestApp {
        app: Router,
        store: Arc<MemoryDonationStore>,
        processor: Arc<MockPaymentProcessor>,
    }

    async fn test_app() -> TestApp {
        let store = Arc::new(MemoryDonationStore::new());
        store
            .add_user(User { id: UserId(1), email: DONOR.into() })
            .await;
        store
            .add_fundraiser(Fundraiser { id: FundraiserId(5), title: "Community garden".into() })
            .await;

        let processor = Arc::new(MockPaymentProcessor::new(WEBHOOK_SECRET));
        let state = AppState::new(
            store.clone(),
            processor.clone(),
            TokenVerifier::new(JWT_SECRET),
            "https://give.example.org",
        );

        TestApp { app: router(state), store, processor }
    }

    fn make_session_request(email: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/make_session")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(email) = email {
            builder = builder.header(
                header::AUTHORIZATION,
                format!("Bearer {}", token_for(JWT_SECRET, email)),
            );
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn confirm_request(signature: Option<&str>, body: String) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/donations/confirm");
        if let Some(signature) = signature {
            builder = builder.header("Stripe-Signature", signature);
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn health_reports_version() {
        let t = test_app().await;
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let (status, body) = send(&t.app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn make_session_creates_pending_donation() {
        let t = test_app().await;
        let body = json!({"line_item": {"amount": "10.005"}, "fundraiser_id": 5}).to_string();

        let (status, response) = send(&t.app, make_session_request(Some(DONOR), &body)).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(response, json!({"session_id": "cs_test_1"}));

        let donations = t.store.donations().await;
        assert_eq!(donations.len(), 1);
        assert_eq!(donations[0].amount, 1001);
        assert_eq!(donations[0].stripe_session, "cs_test_1");
        assert!(!donations[0].payment_finalized);
    }

    #[tokio::test]
    async fn make_session_requires_token() {
        let t = test_app().await;
        let body = json!({"line_item": {"amount": "5"}, "fundraiser_id": 5}).to_string();

        let (status, response) = send(&t.app, make_session_request(None, &body)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(response["message"], "Missing or invalid access token.");
        assert!(t.store.donations().await.is_empty());
    }

    #[tokio::test]
    async fn make_session_empty_body() {
        let t = test_app().await;

        let (status, response) = send(&t.app, make_session_request(Some(DONOR), "{}")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({"error": "Malformed request data."}));
        assert!(t.store.donations().await.is_empty());
    }

    #[tokio::test]
    async fn make_session_bad_amount() {
        let t = test_app().await;
        let body = json!({"line_item": {"amount": "twenty"}, "fundraiser_id": 5}).to_string();

        let (status, response) = send(&t.app, make_session_request(Some(DONOR), &body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({"error": "Couldn't parse donation amount."}));
    }

    #[tokio::test]
    async fn make_session_unknown_fundraiser() {
        let t = test_app().await;
        let body = json!({"line_item": {"amount": "5"}, "fundraiser_id": 77}).to_string();

        let (status, response) = send(&t.app, make_session_request(Some(DONOR), &body)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(response, json!({"message": "Fundraiser does not exist."}));
        assert!(t.store.donations().await.is_empty());
        assert!(t.processor.requests().is_empty());
    }

    #[tokio::test]
    async fn make_session_unknown_user() {
        let t = test_app().await;
        let body = json!({"line_item": {"amount": "5"}, "fundraiser_id": 5}).to_string();

        let (status, response) =
            send(&t.app, make_session_request(Some("ghost@example.com"), &body)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(response, json!({"message": "Please log in before donating."}));
    }

    #[tokio::test]
    async fn make_session_stripe_failure() {
        let t = test_app().await;
        t.processor.fail_checkout(true);
        let body = json!({"line_item": {"amount": "5"}, "fundraiser_id": 5}).to_string();

        let (status, _) = send(&t.app, make_session_request(Some(DONOR), &body)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(t.store.donations().await.is_empty());
    }

    #[tokio::test]
    async fn confirm_finalizes_and_tolerates_replay() {
        let t = test_app().await;
        let body = json!({"line_item": {"amount": "5"}, "fundraiser_id": 5}).to_string();
        send(&t.app, make_session_request(Some(DONOR), &body)).await;

        let event = MockPaymentProcessor::event_payload(CHECKOUT_SESSION_COMPLETED, "cs_test_1");
        for _ in 0..2 {
            let (status, response) =
                send(&t.app, confirm_request(Some(WEBHOOK_SECRET), event.clone())).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(response, json!({"message": "OK"}));
            assert!(t.store.donations().await[0].payment_finalized);
        }
        assert_eq!(t.store.donations().await.len(), 1);
    }

    #[tokio::test]
    async fn confirm_unknown_session() {
        let t = test_app().await;
        let event = MockPaymentProcessor::event_payload(CHECKOUT_SESSION_COMPLETED, "cs_missing");

        let (status, response) = send(&t.app, confirm_request(Some(WEBHOOK_SECRET), event)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response, json!({"error": "No donation record for this session."}));
        assert!(t.store.donations().await.is_empty());
    }

    #[tokio::test]
    async fn confirm_ignores_other_events() {
        let t = test_app().await;
        let body = json!({"line_item": {"amount": "5"}, "fundraiser_id": 5}).to_string();
        send(&t.app, make_session_request(Some(DONOR), &body)).await;

        let event = MockPaymentProcessor::event_payload("payment_intent.created", "cs_test_1");
        let (status, _) = send(&t.app, confirm_request(Some(WEBHOOK_SECRET), event)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(!t.store.donations().await[0].payment_finalized);
    }

    #[tokio::test]
    async fn confirm_rejects_bad_signature_and_payload() {
        let t = test_app().await;
        let event = MockPaymentProcessor::event_payload(CHECKOUT_SESSION_COMPLETED, "cs_test_1");

        let (status, response) = send(&t.app, confirm_request(Some("forged"), event.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({"error": "Invalid message signature."}));

        let (status, _) = send(&t.app, confirm_request(None, event)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, response) =
            send(&t.app, confirm_request(Some(WEBHOOK_SECRET), "{oops".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({"error": "Invalid payload."}));
    }
}
