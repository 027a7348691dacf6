// chain/src/mempool.rs

//! The in-memory mempool: an ordered, composite-key-deduplicated queue
//! of admitted-but-unmined transactions.

use std::collections::HashSet;

use crate::types::tx::CompositeKey;
use crate::types::Transaction;

#[derive(Default)]
pub struct Mempool {
    txs: Vec<Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Mempool { txs: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    pub fn as_slice(&self) -> &[Transaction] {
        &self.txs
    }

    pub fn contains_key(&self, key: &CompositeKey) -> bool {
        self.txs.iter().any(|t| &t.composite_key() == key)
    }

    /// Admits `tx`, in insertion order. The caller is responsible for
    /// having already checked for duplicates against chain + mempool.
    pub fn push(&mut self, tx: Transaction) {
        self.txs.push(tx);
    }

    /// Removes every transaction whose composite key is in `keys`,
    /// preserving the relative order of the rest. Used after a block is
    /// mined or accepted.
    pub fn prune(&mut self, keys: &HashSet<CompositeKey>) {
        self.txs.retain(|t| !keys.contains(&t.composite_key()));
    }

    pub fn replace(&mut self, txs: Vec<Transaction>) {
        self.txs = txs;
    }

    pub fn clear(&mut self) {
        self.txs.clear();
    }

    /// Appends any transaction from `incoming` whose composite key is
    /// not already present locally, verifying signed entries first.
    /// Used by the sync daemon when merging a peer's larger mempool.
    pub fn merge_new(&mut self, incoming: Vec<Transaction>) -> usize {
        let existing: HashSet<CompositeKey> = self.txs.iter().map(|t| t.composite_key()).collect();
        let mut added = 0;
        for tx in incoming {
            if !existing.contains(&tx.composite_key()) {
                self.txs.push(tx);
                added += 1;
            }
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Action;

    fn tx(batch_id: &str, action: Action) -> Transaction {
        Transaction {
            batch_id: batch_id.to_string(),
            action,
            actor: "Supplier_A".to_string(),
            metadata: Default::default(),
            timestamp: "2026-01-01T00:00:00".to_string(),
            signature: None,
            public_key: None,
        }
    }

    #[test]
    fn push_preserves_insertion_order() {
        let mut pool = Mempool::new();
        pool.push(tx("B1", Action::Registered));
        pool.push(tx("B2", Action::Registered));
        assert_eq!(pool.as_slice()[0].batch_id, "B1");
        assert_eq!(pool.as_slice()[1].batch_id, "B2");
    }

    #[test]
    fn prune_removes_exactly_matching_keys_and_keeps_the_rest() {
        let mut pool = Mempool::new();
        let a = tx("B1", Action::Registered);
        let b = tx("B2", Action::Registered);
        let a_key = a.composite_key();
        pool.push(a);
        pool.push(b);

        let mut keys = HashSet::new();
        keys.insert(a_key);
        pool.prune(&keys);

        assert_eq!(pool.len(), 1);
        assert_eq!(pool.as_slice()[0].batch_id, "B2");
    }

    #[test]
    fn merge_new_skips_existing_composite_keys() {
        let mut pool = Mempool::new();
        let existing = tx("B1", Action::Registered);
        pool.push(existing.clone());

        let added = pool.merge_new(vec![existing, tx("B2", Action::Registered)]);
        assert_eq!(added, 1);
        assert_eq!(pool.len(), 2);
    }
}
