use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chain::{Block, ChainResponse};
use serde_json::{Value, json};

use crate::state::Node;

/// `GET /chain`
pub async fn chain(State(node): State<Arc<Node>>) -> Json<ChainResponse> {
    let chain = node.chain_snapshot().await;
    Json(ChainResponse {
        valid: chain.is_valid(),
        length: chain.len(),
        chain: chain.blocks,
    })
}

/// `POST /receive-block`
///
/// Accepts a block broadcast by the leader. A previous-hash mismatch
/// means this replica has fallen behind or forked; it does not reject
/// outright but reports the gap so the caller (and this replica's own
/// sync daemon) can resync from peers.
pub async fn receive_block(
    State(node): State<Arc<Node>>,
    Json(block): Json<Block>,
) -> (StatusCode, Json<Value>) {
    match node.receive_block(block).await {
        Ok(true) => (StatusCode::OK, Json(json!({ "accepted": true }))),
        Ok(false) => {
            let resync_node = node.clone();
            tokio::spawn(async move { resync_node.sync_once().await });
            (
                StatusCode::CONFLICT,
                Json(json!({
                    "accepted": false,
                    "error": "previous_hash does not match local tip; resync scheduled",
                })),
            )
        }
        Err(reason) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "accepted": false, "error": reason })),
        ),
    }
}
