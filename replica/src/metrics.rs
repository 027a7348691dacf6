//! Minimal Prometheus exposition, folded into the replica's own axum
//! router rather than run as a second HTTP listener: chain length,
//! mempool size, and peer count, refreshed on every scrape.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use prometheus::{Encoder, IntGauge, Registry, TextEncoder};

use crate::state::Node;

pub struct Metrics {
    registry: Registry,
    chain_length: IntGauge,
    mempool_size: IntGauge,
    peer_count: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let chain_length = IntGauge::new("replica_chain_length", "Number of blocks on the local chain")?;
        let mempool_size = IntGauge::new("replica_mempool_size", "Pending transactions in the local mempool")?;
        let peer_count = IntGauge::new("replica_peer_count", "Known peer replicas")?;

        registry.register(Box::new(chain_length.clone()))?;
        registry.register(Box::new(mempool_size.clone()))?;
        registry.register(Box::new(peer_count.clone()))?;

        Ok(Metrics {
            registry,
            chain_length,
            mempool_size,
            peer_count,
        })
    }
}

/// `GET /metrics`
pub async fn metrics(State(node): State<Arc<Node>>) -> (StatusCode, [(header::HeaderName, &'static str); 1], Vec<u8>) {
    let chain = node.chain_snapshot().await;
    node.metrics.chain_length.set(chain.len() as i64);
    node.metrics.mempool_size.set(node.mempool_snapshot().await.len() as i64);
    node.metrics.peer_count.set(node.peers_snapshot().await.len() as i64);

    let encoder = TextEncoder::new();
    let families = node.metrics.registry.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&families, &mut buffer)
        .expect("encoding a gathered metric family never fails");

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        buffer,
    )
}
