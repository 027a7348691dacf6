// chain/src/types/hash.rs

//! SHA-256 hashing and canonical JSON encoding.
//!
//! Every hash in this crate is a lower-case hex-encoded SHA-256 digest.
//! Canonical JSON is what gets hashed or signed: `serde_json`'s default
//! map representation is `BTreeMap`-backed, so `serde_json::to_string`
//! already produces sorted-key, whitespace-free JSON as long as the
//! `preserve_order` feature is never enabled for this workspace.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// A lower-case hex-encoded SHA-256 digest.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, serde::Deserialize)]
pub struct Hash256(pub String);

impl Hash256 {
    /// Hashes raw bytes with SHA-256 and returns the hex digest.
    pub fn of_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Hash256(hex::encode(hasher.finalize()))
    }

    /// Hashes the canonical JSON encoding of `value`.
    pub fn of_canonical<T: Serialize>(value: &T) -> Result<Self, CanonicalizeError> {
        let bytes = canonical_json_bytes(value)?;
        Ok(Self::of_bytes(&bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the digest has at least `difficulty` leading hex zeros.
    pub fn has_leading_zeros(&self, difficulty: u32) -> bool {
        let want = difficulty as usize;
        self.0.len() >= want && self.0.as_bytes()[..want].iter().all(|&b| b == b'0')
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error produced when a value cannot be turned into canonical JSON.
#[derive(Debug)]
pub struct CanonicalizeError(pub String);

impl fmt::Display for CanonicalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to canonicalize value: {}", self.0)
    }
}

impl std::error::Error for CanonicalizeError {}

/// Serializes `value` as sorted-key, whitespace-free JSON bytes.
///
/// This relies on `serde_json::Value`'s map being `BTreeMap`-backed
/// (the crate's `preserve_order` feature must stay disabled for this to
/// hold); round-tripping through `Value` is what guarantees key sorting
/// regardless of the field declaration order of the source struct.
pub fn canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CanonicalizeError> {
    let v = serde_json::to_value(value).map_err(|e| CanonicalizeError(e.to_string()))?;
    serde_json::to_vec(&v).map_err(|e| CanonicalizeError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn of_bytes_is_deterministic_hex() {
        let h1 = Hash256::of_bytes(b"hello");
        let h2 = Hash256::of_bytes(b"hello");
        assert_eq!(h1, h2);
        assert_eq!(h1.as_str().len(), 64);
        assert!(h1.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn canonical_json_sorts_keys_regardless_of_insertion_order() {
        let mut a = BTreeMap::new();
        a.insert("zeta", 1);
        a.insert("alpha", 2);

        let bytes = canonical_json_bytes(&a).unwrap();
        let s = String::from_utf8(bytes).unwrap();
        assert_eq!(s, r#"{"alpha":2,"zeta":1}"#);
    }

    #[test]
    fn has_leading_zeros_checks_hex_prefix() {
        let h = Hash256("00ab12".to_string());
        assert!(h.has_leading_zeros(0));
        assert!(h.has_leading_zeros(1));
        assert!(h.has_leading_zeros(2));
        assert!(!h.has_leading_zeros(3));
    }
}
