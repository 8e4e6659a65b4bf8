//! Payment status state machine.
//!
//! Webhook-driven lifecycle: a payment starts `pending` and settles into
//! exactly one of `succeeded` or `failed`. Settled payments never move again.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment status.
///
/// Serialized as a bare string. Callers of the direct-create endpoint may
/// supply arbitrary labels; those are kept verbatim in `Other` and treated
/// as non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    /// Awaiting confirmation from the processor.
    Pending,

    /// Processor confirmed the charge.
    Succeeded,

    /// Processor reported the charge failed.
    Failed,

    /// Caller-supplied label outside the standard lifecycle.
    Other(String),
}

impl PaymentStatus {
    /// Returns the wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Other(label) => label,
        }
    }

    /// Parses a stored or submitted label. Matching is exact.
    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => PaymentStatus::Pending,
            "succeeded" => PaymentStatus::Succeeded,
            "failed" => PaymentStatus::Failed,
            other => PaymentStatus::Other(other.to_string()),
        }
    }

    /// True once the processor has settled the payment either way.
    pub fn is_settled(&self) -> bool {
        matches!(self, PaymentStatus::Succeeded | PaymentStatus::Failed)
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for PaymentStatus {
    fn from(s: String) -> Self {
        match PaymentStatus::parse(&s) {
            PaymentStatus::Other(_) => PaymentStatus::Other(s),
            known => known,
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl StateMachine for PaymentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, target),
            (Pending, Succeeded) | (Pending, Failed) | (Other(_), Succeeded) | (Other(_), Failed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentStatus::*;
        match self {
            Pending | Other(_) => vec![Succeeded, Failed],
            Succeeded | Failed => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Unit Tests - State Transitions

    #[test]
    fn pending_can_transition_to_succeeded() {
        let result = PaymentStatus::Pending.transition_to(PaymentStatus::Succeeded);
        assert_eq!(result, Ok(PaymentStatus::Succeeded));
    }

    #[test]
    fn pending_can_transition_to_failed() {
        let result = PaymentStatus::Pending.transition_to(PaymentStatus::Failed);
        assert_eq!(result, Ok(PaymentStatus::Failed));
    }

    #[test]
    fn succeeded_cannot_transition_to_failed() {
        assert!(!PaymentStatus::Succeeded.can_transition_to(&PaymentStatus::Failed));
        assert!(PaymentStatus::Succeeded
            .transition_to(PaymentStatus::Failed)
            .is_err());
    }

    #[test]
    fn failed_cannot_transition_to_succeeded() {
        assert!(!PaymentStatus::Failed.can_transition_to(&PaymentStatus::Succeeded));
    }

    #[test]
    fn nothing_transitions_back_to_pending() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Succeeded,
            PaymentStatus::Failed,
            PaymentStatus::Other("processing".to_string()),
        ] {
            assert!(!status.can_transition_to(&PaymentStatus::Pending));
        }
    }

    #[test]
    fn custom_status_can_settle() {
        let status = PaymentStatus::Other("requires_action".to_string());
        assert!(status.can_transition_to(&PaymentStatus::Succeeded));
        assert!(status.can_transition_to(&PaymentStatus::Failed));
        assert!(!status.is_terminal());
    }

    #[test]
    fn settled_states_are_terminal() {
        assert!(PaymentStatus::Succeeded.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
        assert!(!PaymentStatus::Pending.is_terminal());
    }

    // Unit Tests - Serialization

    #[test]
    fn serializes_as_bare_string() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Succeeded).unwrap(),
            "\"succeeded\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Other("on_hold".to_string())).unwrap(),
            "\"on_hold\""
        );
    }

    #[test]
    fn deserializes_known_and_custom_labels() {
        let pending: PaymentStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(pending, PaymentStatus::Pending);

        let custom: PaymentStatus = serde_json::from_str("\"Pending\"").unwrap();
        assert_eq!(custom, PaymentStatus::Other("Pending".to_string()));
    }

    #[test]
    fn default_is_pending() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
    }

    proptest! {
        #[test]
        fn label_roundtrips_through_parse(label in "[a-z_]{1,16}") {
            let status = PaymentStatus::parse(&label);
            prop_assert_eq!(status.as_str(), label.as_str());
        }

        #[test]
        fn settled_is_same_as_terminal(label in "[a-z_]{1,16}") {
            let status = PaymentStatus::parse(&label);
            prop_assert_eq!(status.is_settled(), status.is_terminal());
        }
    }
}
