// chain/src/validation/workflow.rs

//! Workflow-order / role-ownership / shipment-pairing / signature
//! validator — the three-in-order gate described for transaction
//! admission.

use std::sync::Arc;

use super::error::ValidationError;
use crate::keys::KeyRegistry;
use crate::types::{Action, Chain, Transaction};

/// A transaction validator: pure over reads of chain + mempool state,
/// producing `Ok(())` or a reason for rejection. No side effects.
pub trait TxValidator {
    fn validate(
        &self,
        tx: &Transaction,
        chain: &Chain,
        mempool: &[Transaction],
    ) -> Result<(), ValidationError>;
}

/// The validator described in the spec: workflow order, then
/// actor role/ownership, then shipment pairing, then signature.
pub struct WorkflowValidator {
    keys: Arc<KeyRegistry>,
    crypto_enabled: bool,
}

impl WorkflowValidator {
    pub fn new(keys: Arc<KeyRegistry>, crypto_enabled: bool) -> Self {
        WorkflowValidator { keys, crypto_enabled }
    }

    /// Actions on `batch_id`, chain order then mempool order.
    fn history<'a>(
        chain: &'a Chain,
        mempool: &'a [Transaction],
        batch_id: &str,
    ) -> Vec<&'a Transaction> {
        let mut history = chain.transactions_for_batch(batch_id);
        history.extend(mempool.iter().filter(|t| t.batch_id == batch_id));
        history
    }

    fn check_workflow_order(
        tx: &Transaction,
        history: &[&Transaction],
    ) -> Result<(), ValidationError> {
        if history.iter().any(|t| t.action == tx.action) {
            return Err(ValidationError::DuplicateAction { action: tx.action });
        }
        if let Some(required) = tx.action.predecessor() {
            if !history.iter().any(|t| t.action == required) {
                return Err(ValidationError::MissingPredecessor {
                    action: tx.action,
                    required,
                });
            }
        }
        Ok(())
    }

    fn check_role_and_ownership(
        tx: &Transaction,
        history: &[&Transaction],
    ) -> Result<(), ValidationError> {
        let expected_role = tx.action.expected_role();
        let prefix = expected_role.prefix();
        if !tx.actor.to_lowercase().starts_with(prefix) {
            return Err(ValidationError::WrongRole {
                actor: tx.actor.clone(),
                expected_prefix: prefix,
            });
        }

        if let Some(last) = history.last() {
            if last.action.expected_role() == expected_role && last.actor != tx.actor {
                return Err(ValidationError::OwnershipViolation {
                    actor: tx.actor.clone(),
                    expected_actor: last.actor.clone(),
                });
            }
        }
        Ok(())
    }

    fn check_shipment_pairing(
        tx: &Transaction,
        history: &[&Transaction],
    ) -> Result<(), ValidationError> {
        let awaited = match tx.action {
            Action::Received => Action::Shipped,
            Action::ReceivedRetail => Action::Delivered,
            _ => return Ok(()),
        };

        let shipment = history
            .iter()
            .rev()
            .find(|t| t.action == awaited)
            .ok_or(ValidationError::MissingShipment {
                action: tx.action,
                awaited,
            })?;

        let from = tx.metadata_str("from").map(str::to_string);
        if from.as_deref() != Some(shipment.actor.as_str()) {
            return Err(ValidationError::ShipmentSenderMismatch {
                expected: shipment.actor.clone(),
                got: from,
            });
        }

        if let Some(to) = shipment.metadata_str("to") {
            if to != tx.actor {
                return Err(ValidationError::ShipmentRecipientMismatch {
                    expected: to.to_string(),
                    got: tx.actor.clone(),
                });
            }
        }

        Ok(())
    }

    fn check_signature(&self, tx: &Transaction) -> Result<(), ValidationError> {
        let Some(signature) = &tx.signature else {
            return Ok(());
        };
        if tx.timestamp.is_empty() {
            return Err(ValidationError::MissingTimestamp);
        }
        if !self.crypto_enabled {
            return Ok(());
        }
        let message = tx
            .canonical_signed_bytes()
            .map_err(|_| ValidationError::BadSignature)?;
        match self.keys.verify(&tx.actor, &message, signature) {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(ValidationError::BadSignature),
        }
    }
}

impl TxValidator for WorkflowValidator {
    fn validate(
        &self,
        tx: &Transaction,
        chain: &Chain,
        mempool: &[Transaction],
    ) -> Result<(), ValidationError> {
        let history = Self::history(chain, mempool, &tx.batch_id);
        Self::check_workflow_order(tx, &history)?;
        Self::check_role_and_ownership(tx, &history)?;
        Self::check_shipment_pairing(tx, &history)?;
        self.check_signature(tx)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Chain;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn tx(batch_id: &str, action: Action, actor: &str, metadata: &[(&str, &str)]) -> Transaction {
        let mut map = BTreeMap::new();
        for (k, v) in metadata {
            map.insert(k.to_string(), serde_json::Value::String(v.to_string()));
        }
        Transaction {
            batch_id: batch_id.to_string(),
            action,
            actor: actor.to_string(),
            metadata: map,
            timestamp: "2026-01-01T00:00:00".to_string(),
            signature: None,
            public_key: None,
        }
    }

    fn validator() -> WorkflowValidator {
        let dir = tempdir().unwrap();
        let keys = Arc::new(KeyRegistry::new(dir.path()).unwrap());
        WorkflowValidator::new(keys, false)
    }

    #[test]
    fn first_registered_transaction_is_accepted() {
        let v = validator();
        let chain = Chain::new();
        let t = tx("BATCH_001", Action::Registered, "Supplier_A", &[]);
        assert!(v.validate(&t, &chain, &[]).is_ok());
    }

    #[test]
    fn skipping_quality_checked_is_rejected() {
        let v = validator();
        let chain = Chain::new();
        let registered = tx("BATCH_001", Action::Registered, "Supplier_A", &[]);
        let shipped = tx("BATCH_001", Action::Shipped, "Supplier_A", &[]);
        let err = v.validate(&shipped, &chain, &[registered]).unwrap_err();
        assert!(matches!(err, ValidationError::MissingPredecessor { .. }));
    }

    #[test]
    fn duplicate_action_is_rejected() {
        let v = validator();
        let chain = Chain::new();
        let registered = tx("BATCH_001", Action::Registered, "Supplier_A", &[]);
        let dup = tx("BATCH_001", Action::Registered, "Supplier_A", &[]);
        let err = v.validate(&dup, &chain, &[registered]).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateAction { .. }));
    }

    #[test]
    fn wrong_role_prefix_is_rejected() {
        let v = validator();
        let chain = Chain::new();
        let t = tx("BATCH_001", Action::Registered, "Distributor_B", &[]);
        let err = v.validate(&t, &chain, &[]).unwrap_err();
        assert!(matches!(err, ValidationError::WrongRole { .. }));
    }

    #[test]
    fn different_supplier_cannot_continue_same_group() {
        let v = validator();
        let chain = Chain::new();
        let registered = tx("BATCH_001", Action::Registered, "Supplier_A", &[]);
        let other_supplier = tx("BATCH_001", Action::QualityChecked, "Supplier_Z", &[]);
        let err = v
            .validate(&other_supplier, &chain, &[registered])
            .unwrap_err();
        assert!(matches!(err, ValidationError::OwnershipViolation { .. }));
    }

    #[test]
    fn shipment_recipient_mismatch_is_rejected() {
        let v = validator();
        let chain = Chain::new();
        let registered = tx("BATCH_002", Action::Registered, "Supplier_A", &[]);
        let qc = tx("BATCH_002", Action::QualityChecked, "Supplier_A", &[]);
        let shipped = tx(
            "BATCH_002",
            Action::Shipped,
            "Supplier_A",
            &[("to", "Distributor_B")],
        );
        let received = tx(
            "BATCH_002",
            Action::Received,
            "Distributor_C",
            &[("from", "Supplier_A")],
        );
        let history = vec![registered, qc, shipped];
        let err = v.validate(&received, &chain, &history).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ShipmentRecipientMismatch { .. }
        ));
    }

    #[test]
    fn received_without_matching_from_is_rejected() {
        let v = validator();
        let chain = Chain::new();
        let registered = tx("BATCH_003", Action::Registered, "Supplier_A", &[]);
        let qc = tx("BATCH_003", Action::QualityChecked, "Supplier_A", &[]);
        let shipped = tx("BATCH_003", Action::Shipped, "Supplier_A", &[]);
        let received = tx(
            "BATCH_003",
            Action::Received,
            "Distributor_B",
            &[("from", "Supplier_Z")],
        );
        let history = vec![registered, qc, shipped];
        let err = v.validate(&received, &chain, &history).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ShipmentSenderMismatch { .. }
        ));
    }

    #[test]
    fn full_happy_path_sequence_is_accepted() {
        let v = validator();
        let chain = Chain::new();
        let mut history: Vec<Transaction> = Vec::new();

        let steps: &[(Action, &str, &[(&str, &str)])] = &[
            (Action::Registered, "Supplier_A", &[]),
            (Action::QualityChecked, "Supplier_A", &[]),
            (Action::Shipped, "Supplier_A", &[("to", "Distributor_B")]),
            (
                Action::Received,
                "Distributor_B",
                &[("from", "Supplier_A")],
            ),
            (Action::Stored, "Distributor_B", &[]),
            (
                Action::Delivered,
                "Distributor_B",
                &[("to", "Retailer_C")],
            ),
            (
                Action::ReceivedRetail,
                "Retailer_C",
                &[("from", "Distributor_B")],
            ),
            (Action::Sold, "Retailer_C", &[]),
        ];

        for (action, actor, metadata) in steps {
            let t = tx("BATCH_999", *action, actor, metadata);
            assert!(
                v.validate(&t, &chain, &history).is_ok(),
                "step {action} by {actor} should be accepted"
            );
            history.push(t);
        }
    }
}
