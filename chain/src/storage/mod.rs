//! Persistence backends.
//!
//! Two backends are offered behind the [`Store`] trait, selected at
//! startup: a relational embedded store (`sqlite`) and a JSON-file
//! store (`file`). Both persist the same three logical tables: the
//! chain, the mempool, and the peer set.

pub mod error;
pub mod file;
pub mod sqlite;

use std::collections::HashSet;

pub use error::StorageError;
pub use file::FileStore;
pub use sqlite::SqliteStore;

use crate::types::{Block, Chain, Transaction};

/// Durable storage for one replica's chain, mempool, and peer set.
///
/// Every write is synchronously durable before the call returns. The
/// store is single-writer per replica; callers serialize access
/// themselves (the replica's coarse mutex).
pub trait Store: Send + Sync {
    fn append_block(&self, block: &Block) -> Result<(), StorageError>;
    fn load_chain(&self) -> Result<Vec<Block>, StorageError>;

    fn insert_mempool_tx(&self, tx: &Transaction) -> Result<(), StorageError>;
    /// Deletes every stored mempool row whose composite key is in `keys`.
    fn delete_mempool_txs(
        &self,
        keys: &HashSet<crate::types::tx::CompositeKey>,
    ) -> Result<(), StorageError>;
    fn clear_mempool(&self) -> Result<(), StorageError>;
    fn load_mempool(&self) -> Result<Vec<Transaction>, StorageError>;

    fn insert_peer(&self, url: &str) -> Result<(), StorageError>;
    fn delete_peer(&self, url: &str) -> Result<(), StorageError>;
    fn load_peers(&self) -> Result<Vec<String>, StorageError>;

    /// Overwrites the persisted chain in one durable operation, used
    /// when adopting a remote chain.
    fn replace_chain(&self, chain: &Chain) -> Result<(), StorageError>;
}
