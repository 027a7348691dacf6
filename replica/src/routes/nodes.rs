use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chain::NodesResponse;
use chain::replication::RegisterNodeRequest;
use serde_json::{Value, json};

use crate::state::Node;

/// `POST /nodes/register`
pub async fn register(
    State(node): State<Arc<Node>>,
    Json(req): Json<RegisterNodeRequest>,
) -> (StatusCode, Json<Value>) {
    node.register_peer(req.url.clone()).await;
    (StatusCode::CREATED, Json(json!({ "registered": req.url })))
}

/// `GET /nodes`
pub async fn list(State(node): State<Arc<Node>>) -> Json<NodesResponse> {
    Json(NodesResponse {
        nodes: node.peers_snapshot().await,
    })
}

/// `POST /sync`
///
/// Forces an immediate consensus/replication cycle, the same one the
/// background sync daemon runs on its regular cadence.
pub async fn sync(State(node): State<Arc<Node>>) -> (StatusCode, Json<Value>) {
    node.sync_once().await;
    (StatusCode::OK, Json(json!({ "synced": true })))
}
