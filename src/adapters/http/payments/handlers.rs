//! HTTP handlers for payment endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use crate::application::handlers::payment::{
    CreatePaymentHandler, CreatePaymentIntentHandler, GetPaymentHandler, GetPaymentQuery,
    GetPaymentStatisticsHandler, HandlePaymentWebhookCommand, HandlePaymentWebhookHandler,
    ListPaymentsHandler, ListPaymentsQuery,
};
use crate::domain::payment::PaymentError;
use crate::ports::{PaymentProcessor, PaymentReader, PaymentRepository, WebhookEventRepository};

use super::dto::{
    ApiResponse, CreatePaymentIntentRequest, CreatePaymentRequest, HealthResponse,
    PaymentIntentResponse, RouteNotFound, WebhookAck,
};

/// Header carrying the processor's webhook signature.
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
#[derive(Clone)]
pub struct PaymentAppState {
    pub payment_repository: Arc<dyn PaymentRepository>,
    pub payment_reader: Arc<dyn PaymentReader>,
    pub payment_processor: Arc<dyn PaymentProcessor>,
    pub webhook_events: Arc<dyn WebhookEventRepository>,
    /// Currency used when an intent request names none.
    pub default_currency: String,
}

impl PaymentAppState {
    pub fn create_payment_handler(&self) -> CreatePaymentHandler {
        CreatePaymentHandler::new(self.payment_repository.clone())
    }

    pub fn create_payment_intent_handler(&self) -> CreatePaymentIntentHandler {
        CreatePaymentIntentHandler::new(
            self.payment_processor.clone(),
            self.payment_repository.clone(),
            self.default_currency.clone(),
        )
    }

    pub fn get_payment_handler(&self) -> GetPaymentHandler {
        GetPaymentHandler::new(self.payment_repository.clone())
    }

    pub fn list_payments_handler(&self) -> ListPaymentsHandler {
        ListPaymentsHandler::new(self.payment_reader.clone())
    }

    pub fn statistics_handler(&self) -> GetPaymentStatisticsHandler {
        GetPaymentStatisticsHandler::new(self.payment_reader.clone())
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.payment_repository.clone(),
            self.payment_processor.clone(),
            self.webhook_events.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Customer Endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// POST /v1/customer/payment-intent - Create a processor intent and its pending payment
pub async fn create_payment_intent(
    State(state): State<PaymentAppState>,
    body: Result<Json<CreatePaymentIntentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, PaymentApiError> {
    const FAILURE: &str = "Error creating payment intent";

    let Json(request) = body.map_err(|e| PaymentApiError::rejected(e, FAILURE))?;
    let result = state
        .create_payment_intent_handler()
        .handle(request.into())
        .await
        .map_err(|e| PaymentApiError::new(e, FAILURE))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Payment intent created successfully",
            PaymentIntentResponse::from(result),
        )),
    ))
}

/// POST /v1/customer/payments - Create a payment directly
pub async fn create_payment(
    State(state): State<PaymentAppState>,
    body: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, PaymentApiError> {
    const FAILURE: &str = "Error creating payment";

    let Json(request) = body.map_err(|e| PaymentApiError::rejected(e, FAILURE))?;
    let payment = state
        .create_payment_handler()
        .handle(request.into())
        .await
        .map_err(|e| PaymentApiError::new(e, FAILURE))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Payment created successfully", payment)),
    ))
}

/// GET /v1/customer/{customer_Id}/payments - List one customer's payments
pub async fn list_customer_payments(
    State(state): State<PaymentAppState>,
    Path(customer_id): Path<String>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let payments = state
        .list_payments_handler()
        .handle(ListPaymentsQuery::for_customer(customer_id))
        .await
        .map_err(|e| PaymentApiError::new(e, "Error retrieving customer payments"))?;

    Ok(Json(ApiResponse::success(
        "Customer payments retrieved successfully",
        payments,
    )))
}

/// GET /v1/customer/payments/{payment_Id} and /v1/admin/payments/{payment_Id}
pub async fn get_payment(
    State(state): State<PaymentAppState>,
    Path(payment_id): Path<String>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let payment = state
        .get_payment_handler()
        .handle(GetPaymentQuery { payment_id })
        .await
        .map_err(|e| PaymentApiError::new(e, "Error retrieving payment"))?;

    Ok(Json(ApiResponse::success(
        "Payment retrieved successfully",
        payment,
    )))
}

// ════════════════════════════════════════════════════════════════════════════════
// Admin Endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// GET /v1/admin/payments - List every payment
pub async fn list_payments(
    State(state): State<PaymentAppState>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let payments = state
        .list_payments_handler()
        .handle(ListPaymentsQuery::all())
        .await
        .map_err(|e| PaymentApiError::new(e, "Error retrieving payments"))?;

    Ok(Json(ApiResponse::success(
        "Payments retrieved successfully",
        payments,
    )))
}

/// GET /v1/admin/statistics/payments - Statistics snapshot
pub async fn get_payment_statistics(
    State(state): State<PaymentAppState>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let statistics = state
        .statistics_handler()
        .handle()
        .await
        .map_err(|e| PaymentApiError::new(e, "Error retrieving payment statistics"))?;

    Ok(Json(ApiResponse::success(
        "Payment statistics retrieved successfully",
        statistics,
    )))
}

// ════════════════════════════════════════════════════════════════════════════════
// Public Endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// POST /v1/public/stripe-webhook - Processor webhook
///
/// The body is taken as raw bytes; the signature covers them exactly.
pub async fn handle_stripe_webhook(
    State(state): State<PaymentAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookApiError(PaymentError::InvalidSignature))?;

    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    state.webhook_handler().handle(cmd).await?;

    Ok(Json(WebhookAck { received: true }))
}

/// GET /health - Liveness
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "Payment Service Online".to_string(),
    })
}

/// Fallback for unmatched routes.
pub async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(RouteNotFound {
            error: "Route Not Found".to_string(),
        }),
    )
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts payment errors to enveloped HTTP responses.
///
/// Carries the endpoint's failure message; `NotFound` always reports
/// "Payment not found".
#[derive(Debug)]
pub struct PaymentApiError {
    error: PaymentError,
    failure_message: &'static str,
}

impl PaymentApiError {
    pub fn new(error: impl Into<PaymentError>, failure_message: &'static str) -> Self {
        Self {
            error: error.into(),
            failure_message,
        }
    }

    /// Body could not be parsed into the request type.
    pub fn rejected(rejection: JsonRejection, failure_message: &'static str) -> Self {
        Self::new(
            PaymentError::validation("body", rejection.body_text()),
            failure_message,
        )
    }

    pub fn error(&self) -> &PaymentError {
        &self.error
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.error {
            PaymentError::ValidationFailed { .. }
            | PaymentError::InvalidSignature
            | PaymentError::InvalidPayload(_) => (StatusCode::BAD_REQUEST, self.failure_message),
            PaymentError::NotFound(_) => (StatusCode::NOT_FOUND, "Payment not found"),
            PaymentError::Upstream(_) | PaymentError::Unexpected(_) => {
                error!(error = %self.error, "{}", self.failure_message);
                (StatusCode::INTERNAL_SERVER_ERROR, self.failure_message)
            }
        };

        let detail = match &self.error {
            err @ PaymentError::ValidationFailed { .. } => Some(err.message()),
            _ => None,
        };

        (status, Json(ApiResponse::error(message, detail))).into_response()
    }
}

/// Webhook error response. Processors expect plain text, not the envelope.
#[derive(Debug)]
pub struct WebhookApiError(PaymentError);

impl From<PaymentError> for WebhookApiError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        if self.0.is_client_error() {
            warn!(error = %self.0, "Rejected webhook");
            (StatusCode::BAD_REQUEST, format!("Webhook Error: {}", self.0.message())).into_response()
        } else {
            error!(error = %self.0, "Webhook handling failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Webhook handling failed").into_response()
        }
    }
}
