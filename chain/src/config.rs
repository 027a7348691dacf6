//! Tunable parameters for a replica's embedded engine.
//!
//! This aggregates everything the `chain` crate needs besides its own
//! code: proof-of-work difficulty, mining-trigger timing, sync timing,
//! peer call timeouts, and the mempool backpressure bound hinted at by
//! the original service's `max_mempool_size` construction parameter.

use std::time::Duration;

use crate::miner::MiningConfig;

#[derive(Clone, Debug)]
pub struct ChainConfig {
    /// Number of leading hex zeros a mined block's hash must have.
    pub difficulty: u32,
    pub mining: MiningConfig,
    /// Sync/consensus daemon cadence.
    pub sync_interval: Duration,
    pub sync_warmup: Duration,
    /// Timeout for any single outbound peer HTTP call.
    pub peer_timeout: Duration,
    /// Soft cap on mempool size before admission starts getting
    /// pushback; not named in the retrieved Python source directly but
    /// implied by `Blockchain(..., max_mempool_size=1000)` — a bound
    /// that keeps an unbounded gossip merge from growing memory use
    /// without limit.
    pub max_mempool_size: usize,
    pub crypto_enabled: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            difficulty: 2,
            mining: MiningConfig::default(),
            sync_interval: Duration::from_secs(30),
            sync_warmup: Duration::from_secs(10),
            peer_timeout: Duration::from_secs(3),
            max_mempool_size: 1000,
            crypto_enabled: true,
        }
    }
}
