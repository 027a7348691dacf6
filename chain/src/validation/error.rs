use std::fmt;

use crate::types::Action;

/// Reason a transaction was rejected by the validator. The `Display`
/// text is what gets returned to the submitting client as the 400
/// body's human-readable reason.
#[derive(Debug, Eq, PartialEq)]
pub enum ValidationError {
    MissingPredecessor { action: Action, required: Action },
    DuplicateAction { action: Action },
    WrongRole { actor: String, expected_prefix: &'static str },
    OwnershipViolation { actor: String, expected_actor: String },
    MissingShipment { action: Action, awaited: Action },
    ShipmentSenderMismatch { expected: String, got: Option<String> },
    ShipmentRecipientMismatch { expected: String, got: String },
    MissingTimestamp,
    BadSignature,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingPredecessor { action, required } => write!(
                f,
                "action '{action}' requires prior '{required}' for this batch"
            ),
            ValidationError::DuplicateAction { action } => {
                write!(f, "action '{action}' has already been recorded for this batch")
            }
            ValidationError::WrongRole { actor, expected_prefix } => write!(
                f,
                "actor '{actor}' does not have the expected '{expected_prefix}' role prefix"
            ),
            ValidationError::OwnershipViolation { actor, expected_actor } => write!(
                f,
                "actor '{actor}' may not continue this batch; expected the same actor as before ('{expected_actor}')"
            ),
            ValidationError::MissingShipment { action, awaited } => write!(
                f,
                "'{action}' has no matching prior '{awaited}' transaction for this batch"
            ),
            ValidationError::ShipmentSenderMismatch { expected, got } => write!(
                f,
                "shipment-sender mismatch: expected metadata.from = '{expected}', got {got:?}"
            ),
            ValidationError::ShipmentRecipientMismatch { expected, got } => write!(
                f,
                "shipment-recipient mismatch: shipment was addressed to '{expected}', received by '{got}'"
            ),
            ValidationError::MissingTimestamp => {
                write!(f, "a signed transaction must carry a client-supplied timestamp")
            }
            ValidationError::BadSignature => write!(f, "signature does not verify"),
        }
    }
}

impl std::error::Error for ValidationError {}
