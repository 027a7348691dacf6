// chain/src/replication/client.rs

//! HTTP client used for peer-to-peer calls: forwarding, broadcast, and
//! sync. Short timeouts; failures are reported, never retried here —
//! the caller (daemon or forwarding handler) decides what to do.

use std::fmt;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;

use super::dto::{ChainResponse, MempoolResponse, NodesResponse, RegisterNodeRequest, StatusResponse};
use crate::types::{Block, Transaction};

#[derive(Debug)]
pub enum PeerClientError {
    Unreachable(String),
    Decode(String),
}

impl fmt::Display for PeerClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerClientError::Unreachable(msg) => write!(f, "peer unreachable: {msg}"),
            PeerClientError::Decode(msg) => write!(f, "peer returned unexpected body: {msg}"),
        }
    }
}

impl std::error::Error for PeerClientError {}

pub struct PeerClient {
    http: Client,
}

impl PeerClient {
    pub fn new(timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client with a fixed timeout should always build");
        PeerClient { http }
    }

    pub async fn get_status(&self, base_url: &str) -> Result<StatusResponse, PeerClientError> {
        self.get_json(base_url, "/status").await
    }

    pub async fn get_chain(&self, base_url: &str) -> Result<ChainResponse, PeerClientError> {
        self.get_json(base_url, "/chain").await
    }

    pub async fn get_mempool(&self, base_url: &str) -> Result<MempoolResponse, PeerClientError> {
        self.get_json(base_url, "/mempool").await
    }

    pub async fn get_nodes(&self, base_url: &str) -> Result<NodesResponse, PeerClientError> {
        self.get_json(base_url, "/nodes").await
    }

    pub async fn register_node(&self, base_url: &str, my_url: &str) -> Result<(), PeerClientError> {
        let body = RegisterNodeRequest {
            url: my_url.to_string(),
        };
        self.http
            .post(format!("{base_url}/nodes/register"))
            .json(&body)
            .send()
            .await
            .map_err(|e| PeerClientError::Unreachable(e.to_string()))?;
        Ok(())
    }

    /// Broadcasts a transaction to a peer's `/receive-transaction`.
    pub async fn send_transaction(
        &self,
        base_url: &str,
        tx: &Transaction,
    ) -> Result<(), PeerClientError> {
        self.http
            .post(format!("{base_url}/receive-transaction"))
            .json(tx)
            .send()
            .await
            .map_err(|e| PeerClientError::Unreachable(e.to_string()))?;
        Ok(())
    }

    /// Forwards a client submission to the leader and returns its
    /// response status + body verbatim.
    pub async fn forward_transaction(
        &self,
        leader_base_url: &str,
        tx: &Transaction,
    ) -> Result<(StatusCode, Value), PeerClientError> {
        let resp = self
            .http
            .post(format!("{leader_base_url}/add-transaction"))
            .json(tx)
            .send()
            .await
            .map_err(|e| PeerClientError::Unreachable(e.to_string()))?;
        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .map_err(|e| PeerClientError::Decode(e.to_string()))?;
        Ok((status, body))
    }

    /// Broadcasts a mined block to a peer's `/receive-block`.
    pub async fn send_block(&self, base_url: &str, block: &Block) -> Result<(), PeerClientError> {
        self.http
            .post(format!("{base_url}/receive-block"))
            .json(block)
            .send()
            .await
            .map_err(|e| PeerClientError::Unreachable(e.to_string()))?;
        Ok(())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        base_url: &str,
        path: &str,
    ) -> Result<T, PeerClientError> {
        let resp = self
            .http
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .map_err(|e| PeerClientError::Unreachable(e.to_string()))?;
        resp.json::<T>()
            .await
            .map_err(|e| PeerClientError::Decode(e.to_string()))
    }
}
