use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chain::StatusResponse;

use crate::state::Node;

/// `GET /status`
///
/// Liveness, chain/mempool size, peer count, readiness, and the
/// currently elected leader as this replica sees it.
pub async fn status(State(node): State<Arc<Node>>) -> Json<StatusResponse> {
    let chain = node.chain_snapshot().await;
    let mempool_size = node.mempool_snapshot().await.len();
    let peer_count = node.peers_snapshot().await.len();
    let leader = node.current_leader().await;

    Json(StatusResponse {
        hostname: node.self_url.clone(),
        chain_length: chain.len() as u64,
        chain_valid: chain.is_valid(),
        mempool_size,
        peer_count,
        ready: node.is_ready(),
        is_leader: leader == node.self_url,
        leader,
    })
}
