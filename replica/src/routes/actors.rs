use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::state::Node;

#[derive(Deserialize)]
pub struct RegisterActorRequest {
    pub actor: String,
}

/// `POST /actors/register`
///
/// Generates (or returns the existing) RSA keypair for `actor` and
/// hands back its base64-encoded public key.
pub async fn register(
    State(node): State<Arc<Node>>,
    Json(req): Json<RegisterActorRequest>,
) -> (StatusCode, Json<Value>) {
    match node.keys.register_actor(&req.actor) {
        Ok(public_key) => (
            StatusCode::CREATED,
            Json(json!({ "actor": req.actor, "public_key": public_key })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}

/// `GET /actors`
pub async fn list(State(node): State<Arc<Node>>) -> (StatusCode, Json<Value>) {
    match node.keys.list_actors() {
        Ok(actors) => (StatusCode::OK, Json(json!({ "actors": actors }))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}
