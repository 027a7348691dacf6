//! Chain library crate.
//!
//! This crate provides the embeddable engine for a supply-chain ledger
//! replica:
//!
//! - the block/transaction/chain data model with SHA-256 hash linkage
//!   and proof-of-work (`types`, `miner`),
//! - the actor key registry and RSA-PKCS1v15 signing (`keys`),
//! - the transaction validator (`validation`),
//! - the in-memory mempool (`mempool`),
//! - persistence backends (`storage`),
//! - leader election (`consensus`),
//! - the peer HTTP client and replication DTOs (`replication`),
//! - and a top-level engine configuration (`config`).
//!
//! The `replica` binary composes these pieces with an HTTP router and
//! background daemons to run an actual node.

pub mod config;
pub mod consensus;
pub mod error;
pub mod keys;
pub mod mempool;
pub mod miner;
pub mod replication;
pub mod storage;
pub mod types;
pub mod validation;

pub use config::ChainConfig;
pub use consensus::{PeerStatus, elect_leader};
pub use error::ChainError;
pub use keys::{KeyError, KeyRegistry};
pub use mempool::Mempool;
pub use miner::{MiningConfig, mine_block};
pub use replication::{ChainResponse, MempoolResponse, NodesResponse, PeerClient, StatusResponse};
pub use storage::{FileStore, SqliteStore, Store, StorageError};
pub use types::{Action, Block, Chain, Hash256, Transaction};
pub use validation::{TxValidator, ValidationError, WorkflowValidator};
