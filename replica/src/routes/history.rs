use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};

use crate::state::Node;

#[derive(Serialize)]
pub struct HistoryResponse {
    pub batch_id: String,
    pub history: Vec<chain::Transaction>,
}

/// `GET /history/:batch_id`
///
/// Chronological history for one batch: on-chain entries followed by
/// any still-pending mempool entries.
pub async fn history(
    State(node): State<Arc<Node>>,
    Path(batch_id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let entries = node.history_for_batch(&batch_id).await;
    if entries.is_empty() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no history for batch '{batch_id}'") })),
        );
    }
    (
        StatusCode::OK,
        Json(serde_json::to_value(HistoryResponse { batch_id, history: entries }).unwrap()),
    )
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub batch_id: String,
    pub chain_valid: bool,
    pub batch_present: bool,
    pub history_length: usize,
}

/// `GET /verify/:batch_id`
///
/// Combined chain-validity and batch-presence check.
pub async fn verify(
    State(node): State<Arc<Node>>,
    Path(batch_id): Path<String>,
) -> Json<VerifyResponse> {
    let chain = node.chain_snapshot().await;
    let on_chain = chain.transactions_for_batch(&batch_id);
    let history_length = on_chain.len();

    Json(VerifyResponse {
        batch_id,
        chain_valid: chain.is_valid(),
        batch_present: history_length > 0,
        history_length,
    })
}
