// chain/src/replication/dto.rs

//! Wire DTOs for the replica HTTP surface, shared by the peer client
//! and the replica's own route handlers so both sides agree on shape.

use serde::{Deserialize, Serialize};

use crate::types::{Block, Transaction};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub hostname: String,
    pub chain_length: u64,
    pub chain_valid: bool,
    pub mempool_size: usize,
    pub peer_count: usize,
    pub ready: bool,
    pub leader: String,
    pub is_leader: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
    pub valid: bool,
    pub length: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MempoolResponse {
    pub mempool: Vec<Transaction>,
    pub size: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodesResponse {
    pub nodes: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterNodeRequest {
    pub url: String,
}
