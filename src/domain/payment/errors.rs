//! Payment-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ValidationFailed | 400 |
//! | InvalidSignature | 400 |
//! | InvalidPayload | 400 |
//! | NotFound | 404 |
//! | Upstream | 500 |
//! | Unexpected | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Payment-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// Request input failed validation.
    ValidationFailed { field: String, message: String },

    /// Webhook signature missing, malformed, stale, or wrong.
    InvalidSignature,

    /// Webhook body was authentic but could not be interpreted.
    InvalidPayload(String),

    /// No payment matched the given identifier.
    NotFound(String),

    /// Persistence or processor collaborator failed.
    Upstream(String),

    /// Anything else.
    Unexpected(String),
}

impl PaymentError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PaymentError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        PaymentError::NotFound(id.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        PaymentError::Upstream(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        PaymentError::Unexpected(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PaymentError::ValidationFailed { .. }
            | PaymentError::InvalidSignature
            | PaymentError::InvalidPayload(_) => ErrorCode::ValidationFailed,
            PaymentError::NotFound(_) => ErrorCode::PaymentNotFound,
            PaymentError::Upstream(_) => ErrorCode::DatabaseError,
            PaymentError::Unexpected(_) => ErrorCode::InternalError,
        }
    }

    /// Returns a human-readable description.
    pub fn message(&self) -> String {
        match self {
            PaymentError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            PaymentError::InvalidSignature => "Invalid webhook signature".to_string(),
            PaymentError::InvalidPayload(reason) => format!("Invalid webhook payload: {}", reason),
            PaymentError::NotFound(id) => format!("Payment not found: {}", id),
            PaymentError::Upstream(msg) => format!("Upstream failure: {}", msg),
            PaymentError::Unexpected(msg) => format!("Unexpected error: {}", msg),
        }
    }

    /// Returns true for errors caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PaymentError::ValidationFailed { .. }
                | PaymentError::InvalidSignature
                | PaymentError::InvalidPayload(_)
                | PaymentError::NotFound(_)
        )
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for PaymentError {}

impl From<DomainError> for PaymentError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::PaymentNotFound => PaymentError::NotFound(err.message),
            ErrorCode::ValidationFailed => PaymentError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::DatabaseError => PaymentError::Upstream(err.to_string()),
            _ => PaymentError::Unexpected(err.to_string()),
        }
    }
}

impl From<ValidationError> for PaymentError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().unwrap_or("status").to_string();
        PaymentError::ValidationFailed {
            field,
            message: err.to_string(),
        }
    }
}
