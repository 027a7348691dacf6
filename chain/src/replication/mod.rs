//! Replication layer: the peer HTTP client and the wire DTOs shared
//! between the client and the replica's own routes.

pub mod client;
pub mod dto;

pub use client::{PeerClient, PeerClientError};
pub use dto::{ChainResponse, MempoolResponse, NodesResponse, RegisterNodeRequest, StatusResponse};
