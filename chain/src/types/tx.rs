// chain/src/types/tx.rs

//! Transaction type and its canonical signed form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::action::Action;
use super::hash::{CanonicalizeError, canonical_json_bytes};

/// Composite dedup/ordering key: `(batch_id, action, timestamp)`.
pub type CompositeKey = (String, Action, String);

/// A single signed (or, pre-admission, unsigned) workflow step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    pub batch_id: String,
    pub action: Action,
    pub actor: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    /// ISO-8601 UTC, carried verbatim — never reformatted or reparsed
    /// before hashing/signing.
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub public_key: Option<String>,
}

/// The subset of fields that are hashed/signed: everything except
/// `signature` and `public_key`.
#[derive(Serialize)]
struct SignedSubset<'a> {
    batch_id: &'a str,
    action: Action,
    actor: &'a str,
    metadata: &'a BTreeMap<String, Value>,
    timestamp: &'a str,
}

impl Transaction {
    pub fn composite_key(&self) -> CompositeKey {
        (self.batch_id.clone(), self.action, self.timestamp.clone())
    }

    /// The canonical (sorted-key, whitespace-free) JSON bytes of the
    /// signed subset — what gets hashed and what signatures cover.
    pub fn canonical_signed_bytes(&self) -> Result<Vec<u8>, CanonicalizeError> {
        let subset = SignedSubset {
            batch_id: &self.batch_id,
            action: self.action,
            actor: &self.actor,
            metadata: &self.metadata,
            timestamp: &self.timestamp,
        };
        canonical_json_bytes(&subset)
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        let mut metadata = BTreeMap::new();
        metadata.insert("from".to_string(), Value::String("Supplier_A".to_string()));
        Transaction {
            batch_id: "BATCH_001".to_string(),
            action: Action::Registered,
            actor: "Supplier_A".to_string(),
            metadata,
            timestamp: "2026-01-01T00:00:00".to_string(),
            signature: Some("sig".to_string()),
            public_key: Some("pem".to_string()),
        }
    }

    #[test]
    fn signed_subset_excludes_signature_and_public_key() {
        let tx = sample();
        let bytes = tx.canonical_signed_bytes().unwrap();
        let s = String::from_utf8(bytes).unwrap();
        assert!(!s.contains("signature"));
        assert!(!s.contains("public_key"));
        assert!(s.contains("\"batch_id\":\"BATCH_001\""));
    }

    #[test]
    fn canonicalize_is_deterministic_across_calls() {
        let tx = sample();
        let a = tx.canonical_signed_bytes().unwrap();
        let b = tx.canonical_signed_bytes().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn composite_key_matches_fields() {
        let tx = sample();
        let (batch_id, action, ts) = tx.composite_key();
        assert_eq!(batch_id, "BATCH_001");
        assert_eq!(action, Action::Registered);
        assert_eq!(ts, "2026-01-01T00:00:00");
    }

    #[test]
    fn wire_serialization_round_trips() {
        let tx = sample();
        let json = serde_json::to_string(&tx).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back.batch_id, tx.batch_id);
        assert_eq!(back.action, tx.action);
        assert_eq!(back.signature, tx.signature);
    }
}
