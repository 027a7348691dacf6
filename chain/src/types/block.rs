// chain/src/types/block.rs

//! Block and chain types, canonical hashing, and chain-validity checks.

use serde::{Deserialize, Serialize};

use super::hash::{Hash256, canonical_json_bytes};
use super::tx::Transaction;

/// `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// A block of admitted transactions, hash-linked to its predecessor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: String,
    pub transactions: Vec<Transaction>,
    pub previous_hash: String,
    pub nonce: u64,
    pub hash: String,
}

/// The subset of fields that are hashed: everything except `hash` itself.
#[derive(Serialize)]
struct CanonicalBlock<'a> {
    index: u64,
    timestamp: &'a str,
    transactions: &'a [Transaction],
    previous_hash: &'a str,
    nonce: u64,
}

impl Block {
    pub fn genesis() -> Self {
        let mut block = Block {
            index: 0,
            timestamp: "genesis".to_string(),
            transactions: Vec::new(),
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.compute_hash().as_str().to_string();
        block
    }

    /// Canonical JSON bytes over `{index, timestamp, transactions, previous_hash, nonce}`.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let canon = CanonicalBlock {
            index: self.index,
            timestamp: &self.timestamp,
            transactions: &self.transactions,
            previous_hash: &self.previous_hash,
            nonce: self.nonce,
        };
        canonical_json_bytes(&canon)
            .expect("Block's canonical fields are always serializable to JSON")
    }

    pub fn compute_hash(&self) -> Hash256 {
        Hash256::of_bytes(&self.canonical_bytes())
    }

    /// Composite keys of every transaction this block carries.
    pub fn tx_keys(&self) -> Vec<super::tx::CompositeKey> {
        self.transactions.iter().map(|t| t.composite_key()).collect()
    }
}

/// An ordered, hash-linked list of blocks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Chain {
    pub blocks: Vec<Block>,
}

impl Default for Chain {
    fn default() -> Self {
        Chain::new()
    }
}

impl Chain {
    pub fn new() -> Self {
        Chain {
            blocks: vec![Block::genesis()],
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn tip_hash(&self) -> &str {
        self.tip()
            .map(|b| b.hash.as_str())
            .unwrap_or(GENESIS_PREVIOUS_HASH)
    }

    pub fn next_index(&self) -> u64 {
        self.blocks.len() as u64
    }

    /// Verifies hash-linkage and recomputed-hash equality for every
    /// block, including genesis. Does not re-verify signatures: those
    /// are checked once on admission and their integrity is thereafter
    /// guaranteed by the hash chain.
    pub fn is_valid(&self) -> bool {
        if self.blocks.is_empty() {
            return false;
        }
        let genesis = &self.blocks[0];
        if genesis.compute_hash().as_str() != genesis.hash {
            return false;
        }
        for window in self.blocks.windows(2) {
            let (prev, cur) = (&window[0], &window[1]);
            if cur.previous_hash != prev.hash {
                return false;
            }
            if cur.compute_hash().as_str() != cur.hash {
                return false;
            }
        }
        true
    }

    /// Every `(batch_id, action, timestamp)` key already present on-chain.
    pub fn all_tx_keys(&self) -> std::collections::HashSet<super::tx::CompositeKey> {
        self.blocks.iter().flat_map(|b| b.tx_keys()).collect()
    }

    /// All transactions for `batch_id`, in chain order, across all blocks.
    pub fn transactions_for_batch<'a>(&'a self, batch_id: &str) -> Vec<&'a Transaction> {
        self.blocks
            .iter()
            .flat_map(|b| b.transactions.iter())
            .filter(|t| t.batch_id == batch_id)
            .collect()
    }

    pub fn append(&mut self, block: Block) {
        self.blocks.push(block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_hash_matches_its_own_declared_hash() {
        let genesis = Block::genesis();
        assert_eq!(genesis.compute_hash().as_str(), genesis.hash);
        assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
        assert!(genesis.transactions.is_empty());
    }

    #[test]
    fn fresh_chain_is_valid() {
        let chain = Chain::new();
        assert!(chain.is_valid());
        assert_eq!(chain.len(), 1);
    }

    fn linked_block(prev: &Block, index: u64) -> Block {
        let mut next = Block {
            index,
            timestamp: "t".to_string(),
            transactions: Vec::new(),
            previous_hash: prev.hash.clone(),
            nonce: 0,
            hash: String::new(),
        };
        next.hash = next.compute_hash().as_str().to_string();
        next
    }

    #[test]
    fn tampering_with_previous_hash_breaks_validity() {
        let mut chain = Chain::new();
        let next = linked_block(&chain.blocks[0].clone(), 1);
        chain.append(next);
        assert!(chain.is_valid());

        chain.blocks[1].previous_hash = "deadbeef".to_string();
        assert!(!chain.is_valid());
    }

    #[test]
    fn tampering_with_nonce_without_rehash_breaks_validity() {
        let mut chain = Chain::new();
        let next = linked_block(&chain.blocks[0].clone(), 1);
        chain.append(next);

        chain.blocks[1].nonce += 1;
        assert!(!chain.is_valid());
    }
}
