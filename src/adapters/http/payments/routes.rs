//! Axum router configuration for payment endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_payment, create_payment_intent, get_payment, get_payment_statistics,
    handle_stripe_webhook, health, list_customer_payments, list_payments, route_not_found,
    PaymentAppState,
};

/// Customer-facing routes.
///
/// - `POST /payment-intent` - Create processor intent and pending payment
/// - `POST /payments` - Create payment directly
/// - `GET /payments/:payment_Id` - Fetch one payment
/// - `GET /:customer_Id/payments` - List a customer's payments
pub fn customer_routes() -> Router<PaymentAppState> {
    Router::new()
        .route("/payment-intent", post(create_payment_intent))
        .route("/payments", post(create_payment))
        .route("/payments/:payment_Id", get(get_payment))
        .route("/:customer_Id/payments", get(list_customer_payments))
}

/// Admin routes.
///
/// - `GET /payments` - List every payment
/// - `GET /payments/:payment_Id` - Fetch one payment
/// - `GET /statistics/payments` - Statistics snapshot
pub fn admin_routes() -> Router<PaymentAppState> {
    Router::new()
        .route("/payments", get(list_payments))
        .route("/payments/:payment_Id", get(get_payment))
        .route("/statistics/payments", get(get_payment_statistics))
}

/// Unauthenticated routes; the webhook is verified by signature instead.
pub fn public_routes() -> Router<PaymentAppState> {
    Router::new().route("/stripe-webhook", post(handle_stripe_webhook))
}

/// Create the complete payment service router.
///
/// Mounts the versioned API under `/v1`, the liveness probe at `/health`,
/// and a JSON 404 for everything else.
///
/// # Example
///
/// ```ignore
/// let app = payment_router().with_state(state);
/// ```
pub fn payment_router() -> Router<PaymentAppState> {
    let v1 = Router::new()
        .nest("/customer", customer_routes())
        .nest("/admin", admin_routes())
        .nest("/public", public_routes());

    Router::new()
        .route("/health", get(health))
        .nest("/v1", v1)
        .fallback(route_not_found)
}
