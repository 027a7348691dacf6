// chain/src/storage/file.rs

//! File backend: three JSON documents, written atomically
//! (write-to-temp then rename).

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{Store, StorageError};
use crate::types::{Block, Chain, Transaction};

pub struct FileStore {
    chain_path: PathBuf,
    mempool_path: PathBuf,
    nodes_path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn open(dir: &Path, replica_tag: &str) -> Result<Self, StorageError> {
        fs::create_dir_all(dir).map_err(|e| StorageError::Io(e.to_string()))?;
        let store = FileStore {
            chain_path: dir.join(format!("chain_{replica_tag}.json")),
            mempool_path: dir.join(format!("mempool_{replica_tag}.json")),
            nodes_path: dir.join(format!("nodes_{replica_tag}.json")),
            lock: Mutex::new(()),
        };
        if !store.chain_path.exists() {
            store.write_json(&store.chain_path, &vec![Block::genesis()])?;
        }
        if !store.mempool_path.exists() {
            store.write_json::<Vec<Transaction>>(&store.mempool_path, &Vec::new())?;
        }
        if !store.nodes_path.exists() {
            store.write_json::<Vec<String>>(&store.nodes_path, &Vec::new())?;
        }
        Ok(store)
    }

    fn write_json<T: serde::Serialize>(&self, path: &Path, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(value).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| StorageError::Io(e.to_string()))?;
        fs::rename(&tmp_path, path).map_err(|e| StorageError::Io(e.to_string()))
    }

    fn read_json<T: serde::de::DeserializeOwned + Default>(&self, path: &Path) -> Result<T, StorageError> {
        if !path.exists() {
            return Ok(T::default());
        }
        let data = fs::read_to_string(path).map_err(|e| StorageError::Io(e.to_string()))?;
        serde_json::from_str(&data).map_err(|e| StorageError::Corrupt(e.to_string()))
    }
}

impl Store for FileStore {
    fn append_block(&self, block: &Block) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap();
        let mut blocks: Vec<Block> = self.read_json(&self.chain_path)?;
        blocks.push(block.clone());
        self.write_json(&self.chain_path, &blocks)
    }

    fn load_chain(&self) -> Result<Vec<Block>, StorageError> {
        let _guard = self.lock.lock().unwrap();
        self.read_json(&self.chain_path)
    }

    fn replace_chain(&self, chain: &Chain) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap();
        self.write_json(&self.chain_path, &chain.blocks)
    }

    fn insert_mempool_tx(&self, tx: &Transaction) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap();
        let mut txs: Vec<Transaction> = self.read_json(&self.mempool_path)?;
        txs.push(tx.clone());
        self.write_json(&self.mempool_path, &txs)
    }

    fn delete_mempool_txs(
        &self,
        keys: &HashSet<crate::types::tx::CompositeKey>,
    ) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap();
        let txs: Vec<Transaction> = self.read_json(&self.mempool_path)?;
        let remaining: Vec<Transaction> = txs
            .into_iter()
            .filter(|t| !keys.contains(&t.composite_key()))
            .collect();
        self.write_json(&self.mempool_path, &remaining)
    }

    fn clear_mempool(&self) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap();
        self.write_json::<Vec<Transaction>>(&self.mempool_path, &Vec::new())
    }

    fn load_mempool(&self) -> Result<Vec<Transaction>, StorageError> {
        let _guard = self.lock.lock().unwrap();
        self.read_json(&self.mempool_path)
    }

    fn insert_peer(&self, url: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap();
        let mut peers: Vec<String> = self.read_json(&self.nodes_path)?;
        if !peers.iter().any(|p| p == url) {
            peers.push(url.to_string());
            peers.sort();
        }
        self.write_json(&self.nodes_path, &peers)
    }

    fn delete_peer(&self, url: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap();
        let mut peers: Vec<String> = self.read_json(&self.nodes_path)?;
        peers.retain(|p| p != url);
        self.write_json(&self.nodes_path, &peers)
    }

    fn load_peers(&self) -> Result<Vec<String>, StorageError> {
        let _guard = self.lock.lock().unwrap();
        self.read_json(&self.nodes_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn fresh_store_seeds_genesis_and_empty_collections() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path(), "5001").unwrap();
        assert_eq!(store.load_chain().unwrap().len(), 1);
        assert!(store.load_mempool().unwrap().is_empty());
        assert!(store.load_peers().unwrap().is_empty());
    }

    #[test]
    fn survives_reopen_across_restarts() {
        let dir = tempdir().unwrap();
        {
            let store = FileStore::open(dir.path(), "5001").unwrap();
            store.insert_peer("http://localhost:5002").unwrap();
        }
        let reopened = FileStore::open(dir.path(), "5001").unwrap();
        assert_eq!(reopened.load_peers().unwrap(), vec!["http://localhost:5002"]);
    }
}
