use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chain::{Transaction, ValidationError};
use serde_json::{Value, json};

use crate::state::{AdmitOutcome, Node};

/// `POST /add-transaction`
///
/// Client entry point. If this replica is the current leader, the
/// transaction is validated, admitted, and broadcast. Otherwise it is
/// forwarded to the leader and that leader's response is relayed back
/// verbatim.
pub async fn add_transaction(
    State(node): State<Arc<Node>>,
    Json(tx): Json<Transaction>,
) -> (StatusCode, Json<Value>) {
    if !node.is_ready() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "replica is not ready yet" })),
        );
    }

    let leader = node.current_leader().await;
    if leader != node.self_url {
        return match node.forward_to_leader(&leader, &tx).await {
            Ok((status, body)) => (status, Json(body)),
            Err(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": format!("leader unreachable: {e}") })),
            ),
        };
    }

    let (outcome, tx, peers, forced_block) = node.admit_transaction(tx).await;
    if let Some(block) = &forced_block {
        node.broadcast_block(block).await;
    }
    match outcome {
        AdmitOutcome::Accepted => {
            node.broadcast_transaction(&peers, &tx).await;
            (
                StatusCode::CREATED,
                Json(json!({
                    "batch_id": tx.batch_id,
                    "action": tx.action,
                    "actor": tx.actor,
                })),
            )
        }
        AdmitOutcome::Duplicate => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "transaction already recorded for this batch" })),
        ),
        AdmitOutcome::MempoolFull => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "mempool is at capacity, retry shortly" })),
        ),
        AdmitOutcome::Rejected(reason) => {
            let status = match reason {
                ValidationError::BadSignature | ValidationError::MissingTimestamp => {
                    StatusCode::UNAUTHORIZED
                }
                _ => StatusCode::BAD_REQUEST,
            };
            (status, Json(json!({ "error": reason.to_string() })))
        }
    }
}

/// `POST /receive-transaction`
///
/// Peer-to-peer replication hook. Followers never admit a forwarded
/// transaction to their own mempool — only a mined block makes a
/// transaction durable on a follower — so this just acknowledges.
pub async fn receive_transaction(
    State(node): State<Arc<Node>>,
    Json(tx): Json<Transaction>,
) -> (StatusCode, Json<Value>) {
    let duplicate = node.observe_transaction(&tx).await;
    (
        StatusCode::OK,
        Json(json!({ "acknowledged": true, "duplicate": duplicate })),
    )
}
