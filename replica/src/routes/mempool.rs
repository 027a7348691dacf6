use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chain::MempoolResponse;

use crate::state::Node;

/// `GET /mempool`
pub async fn mempool(State(node): State<Arc<Node>>) -> Json<MempoolResponse> {
    let txs = node.mempool_snapshot().await;
    Json(MempoolResponse {
        size: txs.len(),
        mempool: txs,
    })
}
