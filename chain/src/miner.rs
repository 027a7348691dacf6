// chain/src/miner.rs

//! Proof-of-work block construction.

use crate::types::{Block, Transaction};

/// Mining-trigger tuning: mine when the mempool crosses `threshold`
/// transactions, or when `interval` elapses with a non-empty mempool.
#[derive(Clone, Copy, Debug)]
pub struct MiningConfig {
    pub threshold: usize,
    pub interval: std::time::Duration,
    pub poll_interval: std::time::Duration,
}

impl Default for MiningConfig {
    fn default() -> Self {
        MiningConfig {
            threshold: 10,
            interval: std::time::Duration::from_secs(60),
            poll_interval: std::time::Duration::from_secs(10),
        }
    }
}

/// Mines a block: increments `nonce` from 0 until the canonical hash
/// has `difficulty` leading hex zeros.
pub fn mine_block(
    index: u64,
    timestamp: String,
    transactions: Vec<Transaction>,
    previous_hash: String,
    difficulty: u32,
) -> Block {
    let mut block = Block {
        index,
        timestamp,
        transactions,
        previous_hash,
        nonce: 0,
        hash: String::new(),
    };

    loop {
        let hash = block.compute_hash();
        if hash.has_leading_zeros(difficulty) {
            block.hash = hash.as_str().to_string();
            return block;
        }
        block.nonce += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mined_block_hash_satisfies_difficulty() {
        let block = mine_block(1, "t".to_string(), Vec::new(), "0".to_string(), 2);
        assert!(block.hash.starts_with("00"));
        assert_eq!(block.compute_hash().as_str(), block.hash);
    }

    #[test]
    fn difficulty_zero_mines_immediately() {
        let block = mine_block(1, "t".to_string(), Vec::new(), "0".to_string(), 0);
        assert_eq!(block.nonce, 0);
    }
}
