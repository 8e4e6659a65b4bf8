//! Stripe-specific wire types.
//!
//! These types represent Stripe API objects as they arrive in webhook
//! payloads and REST responses. They stay inside the adapter; the rest of
//! the crate only sees the port types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ════════════════════════════════════════════════════════════════════════════════
// Signature Parsing
// ════════════════════════════════════════════════════════════════════════════════

/// Error parsing the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureParseError {
    /// Header is empty or missing.
    MissingHeader,
    /// Missing timestamp component (t=...).
    MissingTimestamp,
    /// Missing v1 signature component.
    MissingV1Signature,
    /// Invalid timestamp format.
    InvalidTimestamp,
    /// Invalid signature format (not valid hex).
    InvalidSignatureFormat,
}

impl std::fmt::Display for SignatureParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "Missing Stripe-Signature header"),
            Self::MissingTimestamp => write!(f, "Missing timestamp (t=) in signature"),
            Self::MissingV1Signature => write!(f, "Missing v1 signature in header"),
            Self::InvalidTimestamp => write!(f, "Invalid timestamp format"),
            Self::InvalidSignatureFormat => write!(f, "Invalid signature format (not valid hex)"),
        }
    }
}

impl std::error::Error for SignatureParseError {}

/// Parsed Stripe-Signature header components.
///
/// Stripe may send several `v1` entries while a secret is being rolled;
/// a match against any of them is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp when Stripe signed the payload.
    pub timestamp: i64,

    /// v1 signatures (HMAC-SHA256), decoded from hex.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parse a Stripe-Signature header into components.
    ///
    /// ```text
    /// t=<timestamp>,v1=<signature>[,v1=<signature>][,v0=<legacy>]
    /// ```
    ///
    /// Unknown keys (including the legacy `v0`) are ignored.
    pub fn parse(header: &str) -> Result<Self, SignatureParseError> {
        if header.trim().is_empty() {
            return Err(SignatureParseError::MissingHeader);
        }

        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .split_once('=')
                .ok_or(SignatureParseError::MissingTimestamp)?;

            match key.trim() {
                "t" => {
                    timestamp = Some(
                        value
                            .trim()
                            .parse()
                            .map_err(|_| SignatureParseError::InvalidTimestamp)?,
                    );
                }
                "v1" => {
                    v1_signatures.push(
                        hex_decode(value.trim()).ok_or(SignatureParseError::InvalidSignatureFormat)?,
                    );
                }
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureParseError::MissingTimestamp)?;
        if v1_signatures.is_empty() {
            return Err(SignatureParseError::MissingV1Signature);
        }

        Ok(Self {
            timestamp,
            v1_signatures,
        })
    }
}

/// Decode a hex string to bytes.
pub(crate) fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 || !hex.is_ascii() {
        return None;
    }

    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for i in (0..hex.len()).step_by(2) {
        bytes.push(u8::from_str_radix(&hex[i..i + 2], 16).ok()?);
    }
    Some(bytes)
}

/// Encode bytes to hex string.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// ════════════════════════════════════════════════════════════════════════════════
// Stripe Event Types
// ════════════════════════════════════════════════════════════════════════════════

/// Raw Stripe webhook event envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeWebhookEvent {
    /// Unique event identifier (evt_...).
    pub id: String,

    /// Event type (e.g., "payment_intent.succeeded").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix timestamp when the event was created.
    pub created: i64,

    pub data: StripeEventData,

    /// Whether this is a live or test event.
    #[serde(default)]
    pub livemode: bool,
}

/// Event data container.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object affected by this event.
    pub object: serde_json::Value,
}

// ════════════════════════════════════════════════════════════════════════════════
// Stripe Object Types
// ════════════════════════════════════════════════════════════════════════════════

/// Stripe PaymentIntent object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripePaymentIntent {
    /// PaymentIntent ID (pi_...).
    pub id: String,

    /// Amount in minor units.
    #[serde(default)]
    pub amount: i64,

    #[serde(default)]
    pub currency: String,

    /// e.g. requires_payment_method, processing, succeeded.
    #[serde(default)]
    pub status: String,

    /// Only present in responses to the secret-key owner.
    pub client_secret: Option<String>,

    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Stripe error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorBody {
    /// e.g. card_error, invalid_request_error, api_error.
    #[serde(rename = "type")]
    pub error_type: String,

    pub code: Option<String>,

    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ════════════════════════════════════════════════════════════════════════════
    // Signature Header Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn parse_signature_header_valid() {
        let header = format!("t=1704067200,v1={}", "ab".repeat(32));
        let parsed = SignatureHeader::parse(&header).unwrap();

        assert_eq!(parsed.timestamp, 1704067200);
        assert_eq!(parsed.v1_signatures.len(), 1);
        assert_eq!(parsed.v1_signatures[0].len(), 32);
    }

    #[test]
    fn parse_signature_header_collects_multiple_v1() {
        let header = format!(
            "t=1704067200,v1={},v1={},v0={}",
            "aa".repeat(32),
            "bb".repeat(32),
            "cc".repeat(32)
        );
        let parsed = SignatureHeader::parse(&header).unwrap();
        assert_eq!(parsed.v1_signatures.len(), 2);
    }

    #[test]
    fn parse_signature_header_tolerates_whitespace() {
        let header = format!("t=1704067200, v1={}", "ab".repeat(32));
        assert!(SignatureHeader::parse(&header).is_ok());
    }

    #[test]
    fn parse_signature_header_empty() {
        assert_eq!(
            SignatureHeader::parse(""),
            Err(SignatureParseError::MissingHeader)
        );
    }

    #[test]
    fn parse_signature_header_missing_timestamp() {
        let header = format!("v1={}", "ab".repeat(32));
        assert_eq!(
            SignatureHeader::parse(&header),
            Err(SignatureParseError::MissingTimestamp)
        );
    }

    #[test]
    fn parse_signature_header_missing_v1() {
        assert_eq!(
            SignatureHeader::parse("t=1704067200"),
            Err(SignatureParseError::MissingV1Signature)
        );
    }

    #[test]
    fn parse_signature_header_invalid_timestamp() {
        let header = format!("t=yesterday,v1={}", "ab".repeat(32));
        assert_eq!(
            SignatureHeader::parse(&header),
            Err(SignatureParseError::InvalidTimestamp)
        );
    }

    #[test]
    fn parse_signature_header_invalid_hex() {
        assert_eq!(
            SignatureHeader::parse("t=1704067200,v1=not_valid_hex_xyz"),
            Err(SignatureParseError::InvalidSignatureFormat)
        );
    }

    #[test]
    fn parse_signature_header_odd_length_hex() {
        assert_eq!(
            SignatureHeader::parse("t=1704067200,v1=abc"),
            Err(SignatureParseError::InvalidSignatureFormat)
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Hex Encoding Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn hex_encode_bytes() {
        assert_eq!(hex_encode(&[0x00, 0xff, 0x10]), "00ff10");
    }

    #[test]
    fn hex_decode_roundtrip() {
        let original = vec![0xde, 0xad, 0xbe, 0xef];
        assert_eq!(hex_decode(&hex_encode(&original)), Some(original));
    }

    #[test]
    fn hex_decode_rejects_multibyte_input() {
        assert_eq!(hex_decode("éé"), None);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Event Parsing Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn parse_payment_intent_succeeded_event() {
        let json = r#"{
            "id": "evt_1234567890",
            "type": "payment_intent.succeeded",
            "created": 1704067200,
            "data": {
                "object": {
                    "id": "pi_3abc",
                    "object": "payment_intent",
                    "amount": 5000,
                    "currency": "usd",
                    "status": "succeeded",
                    "metadata": {"customer_Id": "cust_1"}
                }
            },
            "livemode": false,
            "pending_webhooks": 1
        }"#;

        let event: StripeWebhookEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, "evt_1234567890");
        assert_eq!(event.event_type, "payment_intent.succeeded");

        let intent: StripePaymentIntent = serde_json::from_value(event.data.object).unwrap();
        assert_eq!(intent.id, "pi_3abc");
        assert_eq!(intent.amount, 5000);
        assert_eq!(intent.metadata.get("customer_Id").unwrap(), "cust_1");
        assert!(intent.client_secret.is_none());
    }

    #[test]
    fn parse_create_intent_response() {
        let json = r#"{
            "id": "pi_3xyz",
            "object": "payment_intent",
            "amount": 1299,
            "currency": "usd",
            "status": "requires_payment_method",
            "client_secret": "pi_3xyz_secret_abc"
        }"#;

        let intent: StripePaymentIntent = serde_json::from_str(json).unwrap();
        assert_eq!(intent.client_secret.as_deref(), Some("pi_3xyz_secret_abc"));
        assert!(intent.metadata.is_empty());
    }

    #[test]
    fn parse_error_response() {
        let json = r#"{"error": {"type": "invalid_request_error", "code": "amount_too_small", "message": "Amount must be at least $0.50 usd"}}"#;
        let body: StripeErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.error.error_type, "invalid_request_error");
        assert_eq!(body.error.code.as_deref(), Some("amount_too_small"));
    }
}
