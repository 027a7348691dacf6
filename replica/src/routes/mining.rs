use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::state::Node;

/// `POST /mine`
///
/// Mines a block from the current mempool. Only the elected leader may
/// mine; followers are expected to receive blocks via `/receive-block`
/// instead.
pub async fn mine(State(node): State<Arc<Node>>) -> (StatusCode, Json<Value>) {
    if !node.is_leader().await {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "only the elected leader may mine" })),
        );
    }

    match node.try_mine().await {
        Some(block) => {
            node.broadcast_block(&block).await;
            (
                StatusCode::CREATED,
                Json(json!({
                    "index": block.index,
                    "hash": block.hash,
                    "transactions": block.transactions.len(),
                })),
            )
        }
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "mempool has nothing left to mine" })),
        ),
    }
}
