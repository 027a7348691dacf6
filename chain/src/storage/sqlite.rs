// chain/src/storage/sqlite.rs

//! Relational embedded store backend (`rusqlite`).
//!
//! Three tables, matching the schema named by the spec:
//! `chain(idx INTEGER PRIMARY KEY, block_json TEXT)`,
//! `mempool(idx INTEGER PRIMARY KEY AUTOINCREMENT, tx_json TEXT)`,
//! `nodes(url TEXT PRIMARY KEY)`.

use std::collections::HashSet;
use std::sync::Mutex;

use rusqlite::Connection;

use super::{Store, StorageError};
use crate::types::{Block, Chain, Transaction};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|e| StorageError::Sqlite(e.to_string()))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS chain (idx INTEGER PRIMARY KEY, block_json TEXT NOT NULL);
             CREATE TABLE IF NOT EXISTS mempool (idx INTEGER PRIMARY KEY AUTOINCREMENT, tx_json TEXT NOT NULL);
             CREATE TABLE IF NOT EXISTS nodes (url TEXT PRIMARY KEY);",
        )
        .map_err(|e| StorageError::Sqlite(e.to_string()))?;
        let store = SqliteStore {
            conn: Mutex::new(conn),
        };
        store.seed_genesis_if_empty()?;
        Ok(store)
    }

    /// A fresh database has no rows in `chain`; persist the genesis
    /// block immediately so restarts always find index 0 on disk,
    /// matching `FileStore::open`'s seeding of its JSON document.
    fn seed_genesis_if_empty(&self) -> Result<(), StorageError> {
        let count: i64 = {
            let conn = self.conn.lock().unwrap();
            conn.query_row("SELECT COUNT(*) FROM chain", [], |row| row.get(0))
                .map_err(|e| StorageError::Sqlite(e.to_string()))?
        };
        if count == 0 {
            self.append_block(&Block::genesis())?;
        }
        Ok(())
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::open(":memory:")
    }
}

impl Store for SqliteStore {
    fn append_block(&self, block: &Block) -> Result<(), StorageError> {
        let conn = self.conn.lock().unwrap();
        let json = serde_json::to_string(block).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        conn.execute(
            "INSERT INTO chain (idx, block_json) VALUES (?1, ?2)",
            rusqlite::params![block.index as i64, json],
        )
        .map_err(|e| StorageError::Sqlite(e.to_string()))?;
        Ok(())
    }

    fn load_chain(&self) -> Result<Vec<Block>, StorageError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT block_json FROM chain ORDER BY idx ASC")
            .map_err(|e| StorageError::Sqlite(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| StorageError::Sqlite(e.to_string()))?;
        let mut blocks = Vec::new();
        for row in rows {
            let json = row.map_err(|e| StorageError::Sqlite(e.to_string()))?;
            let block: Block =
                serde_json::from_str(&json).map_err(|e| StorageError::Corrupt(e.to_string()))?;
            blocks.push(block);
        }
        Ok(blocks)
    }

    fn replace_chain(&self, chain: &Chain) -> Result<(), StorageError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| StorageError::Sqlite(e.to_string()))?;
        tx.execute("DELETE FROM chain", [])
            .map_err(|e| StorageError::Sqlite(e.to_string()))?;
        for block in &chain.blocks {
            let json =
                serde_json::to_string(block).map_err(|e| StorageError::Corrupt(e.to_string()))?;
            tx.execute(
                "INSERT INTO chain (idx, block_json) VALUES (?1, ?2)",
                rusqlite::params![block.index as i64, json],
            )
            .map_err(|e| StorageError::Sqlite(e.to_string()))?;
        }
        tx.commit().map_err(|e| StorageError::Sqlite(e.to_string()))
    }

    fn insert_mempool_tx(&self, tx: &Transaction) -> Result<(), StorageError> {
        let conn = self.conn.lock().unwrap();
        let json = serde_json::to_string(tx).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        conn.execute("INSERT INTO mempool (tx_json) VALUES (?1)", [json])
            .map_err(|e| StorageError::Sqlite(e.to_string()))?;
        Ok(())
    }

    fn delete_mempool_txs(
        &self,
        keys: &HashSet<crate::types::tx::CompositeKey>,
    ) -> Result<(), StorageError> {
        if keys.is_empty() {
            return Ok(());
        }
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT idx, tx_json FROM mempool")
            .map_err(|e| StorageError::Sqlite(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))
            .map_err(|e| StorageError::Sqlite(e.to_string()))?;

        let mut to_delete = Vec::new();
        for row in rows {
            let (idx, json) = row.map_err(|e| StorageError::Sqlite(e.to_string()))?;
            let tx: Transaction =
                serde_json::from_str(&json).map_err(|e| StorageError::Corrupt(e.to_string()))?;
            if keys.contains(&tx.composite_key()) {
                to_delete.push(idx);
            }
        }
        drop(stmt);
        for idx in to_delete {
            conn.execute("DELETE FROM mempool WHERE idx = ?1", [idx])
                .map_err(|e| StorageError::Sqlite(e.to_string()))?;
        }
        Ok(())
    }

    fn clear_mempool(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM mempool", [])
            .map_err(|e| StorageError::Sqlite(e.to_string()))?;
        Ok(())
    }

    fn load_mempool(&self) -> Result<Vec<Transaction>, StorageError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT tx_json FROM mempool ORDER BY idx ASC")
            .map_err(|e| StorageError::Sqlite(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| StorageError::Sqlite(e.to_string()))?;
        let mut txs = Vec::new();
        for row in rows {
            let json = row.map_err(|e| StorageError::Sqlite(e.to_string()))?;
            let tx: Transaction =
                serde_json::from_str(&json).map_err(|e| StorageError::Corrupt(e.to_string()))?;
            txs.push(tx);
        }
        Ok(txs)
    }

    fn insert_peer(&self, url: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO nodes (url) VALUES (?1)",
            [url],
        )
        .map_err(|e| StorageError::Sqlite(e.to_string()))?;
        Ok(())
    }

    fn delete_peer(&self, url: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM nodes WHERE url = ?1", [url])
            .map_err(|e| StorageError::Sqlite(e.to_string()))?;
        Ok(())
    }

    fn load_peers(&self) -> Result<Vec<String>, StorageError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT url FROM nodes ORDER BY url ASC")
            .map_err(|e| StorageError::Sqlite(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| StorageError::Sqlite(e.to_string()))?;
        let mut peers = Vec::new();
        for row in rows {
            peers.push(row.map_err(|e| StorageError::Sqlite(e.to_string()))?);
        }
        Ok(peers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Block;

    #[test]
    fn open_seeds_genesis_block_on_a_fresh_database() {
        let store = SqliteStore::open_in_memory().unwrap();

        let loaded = store.load_chain().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].index, 0);
        assert_eq!(loaded[0].hash, Block::genesis().hash);
    }

    #[test]
    fn append_and_load_chain_round_trips_in_order() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut next = Block::genesis();
        next.index = 1;
        next.previous_hash = next.hash.clone();
        store.append_block(&next).unwrap();

        let loaded = store.load_chain().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].hash, next.hash);
    }

    #[test]
    fn mempool_insert_and_selective_delete() {
        let store = SqliteStore::open_in_memory().unwrap();
        let tx1 = sample_tx("BATCH_1");
        let tx2 = sample_tx("BATCH_2");
        store.insert_mempool_tx(&tx1).unwrap();
        store.insert_mempool_tx(&tx2).unwrap();

        let mut keys = HashSet::new();
        keys.insert(tx1.composite_key());
        store.delete_mempool_txs(&keys).unwrap();

        let remaining = store.load_mempool().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].batch_id, "BATCH_2");
    }

    #[test]
    fn peer_insert_is_idempotent_and_ordered() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_peer("http://b:5002").unwrap();
        store.insert_peer("http://a:5001").unwrap();
        store.insert_peer("http://a:5001").unwrap();

        let peers = store.load_peers().unwrap();
        assert_eq!(peers, vec!["http://a:5001", "http://b:5002"]);
    }

    fn sample_tx(batch_id: &str) -> Transaction {
        Transaction {
            batch_id: batch_id.to_string(),
            action: crate::types::Action::Registered,
            actor: "Supplier_A".to_string(),
            metadata: Default::default(),
            timestamp: "2026-01-01T00:00:00".to_string(),
            signature: None,
            public_key: None,
        }
    }
}
