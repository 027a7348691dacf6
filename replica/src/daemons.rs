//! Background daemons: the mining trigger and the sync/consensus loop.
//!
//! Both run for the lifetime of the process and acquire the node's
//! coarse mutex internally (via [`Node`]'s own methods), so chain
//! adoption during sync never races with block production.

use std::time::Duration;

use crate::state::Node;
use std::sync::Arc;

/// Mines whenever the mempool has reached `threshold` entries or
/// `interval` has elapsed since the last successful mine, whichever
/// comes first, polling every `poll_interval`. Only acts while this
/// replica is the elected leader.
pub async fn run_mining_daemon(node: Arc<Node>) {
    let mining = node.config.mining.clone();
    let mut last_mine = tokio::time::Instant::now();

    loop {
        tokio::time::sleep(mining.poll_interval).await;

        if !node.is_ready() {
            continue;
        }
        if !node.is_leader().await {
            continue;
        }

        let mempool_size = node.mempool_snapshot().await.len();
        let elapsed = last_mine.elapsed();
        if mempool_size < mining.threshold && elapsed < mining.interval {
            continue;
        }

        match node.try_mine().await {
            Some(block) => {
                tracing::info!(index = block.index, hash = %block.hash, "mined block");
                node.broadcast_block(&block).await;
                last_mine = tokio::time::Instant::now();
            }
            None => {
                last_mine = tokio::time::Instant::now();
            }
        }
    }
}

/// Runs the sync/consensus cycle on a fixed cadence after an initial
/// warm-up, so a freshly started replica has a chance to register with
/// its bootstrap peers before comparing chains.
pub async fn run_sync_daemon(node: Arc<Node>, interval: Duration, warmup: Duration) {
    tokio::time::sleep(warmup).await;

    loop {
        node.sync_once().await;
        tokio::time::sleep(interval).await;
    }
}
