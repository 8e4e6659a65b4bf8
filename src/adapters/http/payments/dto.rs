//! HTTP DTOs (Data Transfer Objects) for payment endpoints.
//!
//! Field names follow the existing wire contract (`customer_Id`,
//! `payment_Id`), which clients already depend on.

use serde::{Deserialize, Serialize};

use crate::application::handlers::payment::{
    CreatePaymentCommand, CreatePaymentIntentCommand, CreatePaymentIntentResult,
};

// ════════════════════════════════════════════════════════════════════════════════
// Envelope
// ════════════════════════════════════════════════════════════════════════════════

/// Outcome marker carried by every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Response envelope shared by all payment endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Detail for client errors, e.g. which field failed validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.into(),
            data: None,
            error: detail,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to create a payment intent.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentIntentRequest {
    /// Amount in minor currency units.
    pub amount: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(rename = "customer_Id")]
    pub customer_id: String,
    #[serde(default)]
    pub payment_type: Option<String>,
}

impl From<CreatePaymentIntentRequest> for CreatePaymentIntentCommand {
    fn from(req: CreatePaymentIntentRequest) -> Self {
        Self {
            amount: req.amount,
            currency: req.currency,
            customer_id: req.customer_id,
            payment_type: req.payment_type,
        }
    }
}

/// Request to create a payment directly.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentRequest {
    pub payment_type: String,
    pub amount: f64,
    #[serde(rename = "customer_Id")]
    pub customer_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl From<CreatePaymentRequest> for CreatePaymentCommand {
    fn from(req: CreatePaymentRequest) -> Self {
        Self {
            payment_type: req.payment_type,
            amount: req.amount,
            customer_id: req.customer_id,
            status: req.status,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Data returned after creating a payment intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentResponse {
    pub client_secret: String,
    #[serde(rename = "payment_Id")]
    pub payment_id: String,
    pub payment_intent_id: Option<String>,
}

impl From<CreatePaymentIntentResult> for PaymentIntentResponse {
    fn from(result: CreatePaymentIntentResult) -> Self {
        Self {
            client_secret: result.client_secret,
            payment_id: result.payment.id.to_string(),
            payment_intent_id: result.payment.payment_intent_id,
        }
    }
}

/// Acknowledgement returned to the processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Liveness body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Body for unmatched routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteNotFound {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_includes_data() {
        let body = serde_json::to_value(ApiResponse::success("ok", vec![1, 2])).unwrap();
        assert_eq!(body, json!({"status": "success", "message": "ok", "data": [1, 2]}));
    }

    #[test]
    fn error_envelope_omits_data() {
        let body = serde_json::to_value(ApiResponse::error("Payment not found", None)).unwrap();
        assert_eq!(body, json!({"status": "error", "message": "Payment not found"}));
    }

    #[test]
    fn create_payment_request_uses_wire_names() {
        let req: CreatePaymentRequest = serde_json::from_value(json!({
            "payment_type": "card",
            "amount": 12.5,
            "customer_Id": "cust_1"
        }))
        .unwrap();

        assert_eq!(req.customer_id, "cust_1");
        assert!(req.status.is_none());
    }

    #[test]
    fn intent_request_rejects_fractional_amount() {
        let result: Result<CreatePaymentIntentRequest, _> = serde_json::from_value(json!({
            "amount": 12.5,
            "customer_Id": "cust_1"
        }));
        assert!(result.is_err());
    }
}
