//! The coarse-mutex-guarded node state machine: chain + mempool + peer
//! set behind one lock, plus the collaborators (store, key registry,
//! validator, peer client) needed to act on it.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chain::{
    Block, Chain, ChainConfig, KeyRegistry, Mempool, PeerClient, PeerStatus, Store, Transaction,
    TxValidator, ValidationError, WorkflowValidator, elect_leader, mine_block,
};
use tokio::sync::Mutex;

use crate::metrics::Metrics;

/// Outcome of a client transaction submission, independent of HTTP framing.
pub enum AdmitOutcome {
    Accepted,
    Rejected(ValidationError),
    Duplicate,
    /// The mempool is at its configured bound and a forced synchronous
    /// mine still didn't free room for this transaction.
    MempoolFull,
}

struct NodeState {
    chain: Chain,
    mempool: Mempool,
    peers: BTreeSet<String>,
}

/// Shared state held by the HTTP router and background daemons.
///
/// Wrapped in an [`Arc`] and passed to request handlers via Axum's
/// `State` extractor.
pub struct Node {
    state: Mutex<NodeState>,
    store: Box<dyn Store>,
    pub keys: Arc<KeyRegistry>,
    validator: WorkflowValidator,
    peer_client: PeerClient,
    pub self_url: String,
    pub config: ChainConfig,
    ready: AtomicBool,
    pub metrics: Metrics,
}

pub type SharedNode = Arc<Node>;

impl Node {
    pub fn new(
        store: Box<dyn Store>,
        keys: Arc<KeyRegistry>,
        config: ChainConfig,
        self_url: String,
        bootstrap_peers: Vec<String>,
    ) -> Result<Self, chain::StorageError> {
        let blocks = store.load_chain()?;
        let chain = if blocks.is_empty() {
            Chain::new()
        } else {
            Chain { blocks }
        };

        let mut mempool = Mempool::new();
        mempool.replace(store.load_mempool()?);

        let starts_ready = bootstrap_peers.is_empty();

        let mut peers: BTreeSet<String> = store.load_peers()?.into_iter().collect();
        for p in bootstrap_peers {
            if p != self_url {
                peers.insert(p);
            }
        }

        let validator = WorkflowValidator::new(keys.clone(), config.crypto_enabled);
        let peer_client = PeerClient::new(config.peer_timeout);

        Ok(Node {
            state: Mutex::new(NodeState {
                chain,
                mempool,
                peers,
            }),
            store,
            keys,
            validator,
            peer_client,
            self_url,
            config,
            ready: AtomicBool::new(starts_ready),
            metrics: Metrics::new().expect("metric names are fixed and never collide"),
        })
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    // -----------------------------------------------------------------
    // Status / read-only queries
    // -----------------------------------------------------------------

    pub async fn chain_snapshot(&self) -> Chain {
        self.state.lock().await.chain.clone()
    }

    pub async fn mempool_snapshot(&self) -> Vec<Transaction> {
        self.state.lock().await.mempool.as_slice().to_vec()
    }

    pub async fn peers_snapshot(&self) -> Vec<String> {
        self.state.lock().await.peers.iter().cloned().collect()
    }

    pub async fn history_for_batch(&self, batch_id: &str) -> Vec<Transaction> {
        let guard = self.state.lock().await;
        let mut history: Vec<Transaction> = guard
            .chain
            .transactions_for_batch(batch_id)
            .into_iter()
            .cloned()
            .collect();
        history.extend(
            guard
                .mempool
                .as_slice()
                .iter()
                .filter(|t| t.batch_id == batch_id)
                .cloned(),
        );
        history
    }

    /// Polls every known peer (and self) for status and elects a
    /// leader. The priority list is the sorted union of self + peers,
    /// so it is identical across a replica fleet whose peer sets have
    /// converged via gossip.
    pub async fn current_leader(&self) -> String {
        let (self_len, peers): (u64, Vec<String>) = {
            let guard = self.state.lock().await;
            (guard.chain.len() as u64, guard.peers.iter().cloned().collect())
        };

        let mut priority: Vec<String> = peers.clone();
        priority.push(self.self_url.clone());
        priority.sort();

        let mut reachable = vec![PeerStatus {
            hostname: self.self_url.clone(),
            chain_len: self_len,
        }];

        for peer in &peers {
            if let Ok(status) = self.peer_client.get_status(peer).await {
                reachable.push(PeerStatus {
                    hostname: peer.clone(),
                    chain_len: status.chain_length,
                });
            }
        }

        elect_leader(&priority, &reachable, &self.self_url)
    }

    pub async fn is_leader(&self) -> bool {
        self.current_leader().await == self.self_url
    }

    // -----------------------------------------------------------------
    // Transaction admission
    // -----------------------------------------------------------------

    /// Validates and, on success, admits `tx` to the mempool. Assigns a
    /// server-side timestamp first if the caller left it blank.
    /// Returns the peer list to broadcast to *after* the lock is
    /// released, plus a block if admission had to force a synchronous
    /// mine to stay under `max_mempool_size` (the caller must also
    /// broadcast that block).
    pub async fn admit_transaction(
        &self,
        mut tx: Transaction,
    ) -> (AdmitOutcome, Transaction, Vec<String>, Option<Block>) {
        if tx.timestamp.is_empty() {
            tx.timestamp = server_timestamp();
        }

        let mut guard = self.state.lock().await;

        // Backpressure (§9): if auto-mining is off, nothing else will
        // ever drain the mempool, so admission itself must force a
        // synchronous mine once the bound is reached. Applied
        // regardless of the auto-mine setting so a slow daemon cycle
        // can't let the mempool grow past the bound either.
        let forced_block = if guard.mempool.len() >= self.config.max_mempool_size {
            self.mine_locked(&mut guard)
        } else {
            None
        };

        let key = tx.composite_key();
        if guard.chain.all_tx_keys().contains(&key) || guard.mempool.contains_key(&key) {
            return (AdmitOutcome::Duplicate, tx, Vec::new(), forced_block);
        }

        if guard.mempool.len() >= self.config.max_mempool_size {
            return (AdmitOutcome::MempoolFull, tx, Vec::new(), forced_block);
        }

        if let Err(e) = self.validator.validate(&tx, &guard.chain, guard.mempool.as_slice()) {
            return (AdmitOutcome::Rejected(e), tx, Vec::new(), forced_block);
        }

        guard.mempool.push(tx.clone());
        if let Err(e) = self.store.insert_mempool_tx(&tx) {
            tracing::error!("persistence failure admitting transaction: {e}");
        }

        let peers = guard.peers.iter().cloned().collect();
        (AdmitOutcome::Accepted, tx, peers, forced_block)
    }

    /// Peer-to-peer receipt: never admits to the local mempool, only
    /// checks for a duplicate for logging/idempotency purposes.
    pub async fn observe_transaction(&self, tx: &Transaction) -> bool {
        let guard = self.state.lock().await;
        let key = tx.composite_key();
        guard.chain.all_tx_keys().contains(&key) || guard.mempool.contains_key(&key)
    }

    pub async fn broadcast_transaction(&self, peers: &[String], tx: &Transaction) {
        for peer in peers {
            let peer = peer.clone();
            let tx = tx.clone();
            let peer_client = PeerClient::new(self.config.peer_timeout);
            tokio::spawn(async move {
                if let Err(e) = peer_client.send_transaction(&peer, &tx).await {
                    tracing::warn!(peer = %peer, "broadcast transaction failed: {e}");
                }
            });
        }
    }

    pub async fn forward_to_leader(
        &self,
        leader: &str,
        tx: &Transaction,
    ) -> Result<(reqwest::StatusCode, serde_json::Value), chain::replication::PeerClientError> {
        self.peer_client.forward_transaction(leader, tx).await
    }

    // -----------------------------------------------------------------
    // Mining
    // -----------------------------------------------------------------

    /// Attempts to mine a block from the current mempool snapshot.
    /// Returns `None` if nothing in the mempool is still unmined.
    pub async fn try_mine(&self) -> Option<Block> {
        let mut guard = self.state.lock().await;
        self.mine_locked(&mut guard)
    }

    /// The actual mining work, run against an already-held lock guard
    /// so callers (the mining daemon via [`Self::try_mine`], and
    /// admission backpressure) share one implementation.
    fn mine_locked(&self, guard: &mut NodeState) -> Option<Block> {
        let on_chain = guard.chain.all_tx_keys();
        let candidate: Vec<Transaction> = guard
            .mempool
            .as_slice()
            .iter()
            .filter(|t| !on_chain.contains(&t.composite_key()))
            .cloned()
            .collect();

        if candidate.is_empty() {
            return None;
        }

        let index = guard.chain.next_index();
        let previous_hash = guard.chain.tip_hash().to_string();
        let block = mine_block(
            index,
            server_timestamp(),
            candidate,
            previous_hash,
            self.config.difficulty,
        );

        guard.chain.append(block.clone());
        if let Err(e) = self.store.append_block(&block) {
            tracing::error!("persistence failure appending mined block: {e}");
        }

        let keys: HashSet<_> = block.tx_keys().into_iter().collect();
        guard.mempool.prune(&keys);
        if let Err(e) = self.store.delete_mempool_txs(&keys) {
            tracing::error!("persistence failure pruning mempool after mining: {e}");
        }

        Some(block)
    }

    pub async fn broadcast_block(&self, block: &Block) {
        let peers = self.peers_snapshot().await;
        for peer in peers {
            let block = block.clone();
            let peer_client = PeerClient::new(self.config.peer_timeout);
            tokio::spawn(async move {
                if let Err(e) = peer_client.send_block(&peer, &block).await {
                    tracing::warn!(peer = %peer, "broadcast block failed: {e}");
                }
            });
        }
    }

    /// `Ok(true)` if accepted, `Ok(false)` if the previous-hash does
    /// not match the local tip (caller should schedule a resync),
    /// `Err` if the block itself is malformed (bad hash or a
    /// transaction that duplicates one already on-chain).
    pub async fn receive_block(&self, block: Block) -> Result<bool, String> {
        let mut guard = self.state.lock().await;

        if block.previous_hash != guard.chain.tip_hash() {
            return Ok(false);
        }
        if block.compute_hash().as_str() != block.hash {
            return Err("recomputed hash does not match declared hash".to_string());
        }
        let on_chain = guard.chain.all_tx_keys();
        if block.tx_keys().iter().any(|k| on_chain.contains(k)) {
            return Err("block contains a transaction already present in the local chain".to_string());
        }

        guard.chain.append(block.clone());
        if let Err(e) = self.store.append_block(&block) {
            tracing::error!("persistence failure appending received block: {e}");
        }

        let keys: HashSet<_> = block.tx_keys().into_iter().collect();
        guard.mempool.prune(&keys);
        if let Err(e) = self.store.delete_mempool_txs(&keys) {
            tracing::error!("persistence failure pruning mempool after block receipt: {e}");
        }

        Ok(true)
    }

    // -----------------------------------------------------------------
    // Peers
    // -----------------------------------------------------------------

    pub async fn register_peer(&self, url: String) {
        if url == self.self_url {
            return;
        }
        let mut guard = self.state.lock().await;
        if guard.peers.insert(url.clone()) {
            if let Err(e) = self.store.insert_peer(&url) {
                tracing::error!("persistence failure registering peer: {e}");
            }
        }
    }

    /// Registers each configured bootstrap peer locally, then POSTs
    /// this replica's own URL to it so the peer learns of us too —
    /// without this, gossip only ever flows one way and a bootstrap
    /// peer never discovers a newly joined replica on its own.
    pub async fn bootstrap_with_peers(&self, peers: &[String]) {
        for peer in peers {
            self.register_peer(peer.clone()).await;
            if let Err(e) = self.peer_client.register_node(peer, &self.self_url).await {
                tracing::warn!(peer = %peer, "failed to register self with bootstrap peer: {e}");
            }
        }
    }

    // -----------------------------------------------------------------
    // Sync / consensus daemon body (also invoked by POST /sync)
    // -----------------------------------------------------------------

    pub async fn sync_once(&self) {
        let (local_valid, peers): (bool, Vec<String>) = {
            let guard = self.state.lock().await;
            (guard.chain.is_valid(), guard.peers.iter().cloned().collect())
        };

        for peer in &peers {
            let remote_chain = match self.peer_client.get_chain(peer).await {
                Ok(resp) => resp,
                Err(_) => {
                    tracing::warn!(peer = %peer, "peer unreachable during sync");
                    continue;
                }
            };

            {
                let mut guard = self.state.lock().await;
                let remote = Chain {
                    blocks: remote_chain.chain.clone(),
                };
                let adopt = remote.is_valid() && (!local_valid || remote.len() > guard.chain.len());
                if adopt {
                    guard.chain = remote.clone();
                    if let Err(e) = self.store.replace_chain(&remote) {
                        tracing::error!("persistence failure replacing chain during sync: {e}");
                    }
                    let keys = remote.all_tx_keys();
                    guard.mempool.prune(&keys);
                    if let Err(e) = self.store.delete_mempool_txs(&keys) {
                        tracing::error!("persistence failure pruning mempool after sync: {e}");
                    }
                }
            }

            if let Ok(remote_mempool) = self.peer_client.get_mempool(peer).await {
                let mut guard = self.state.lock().await;
                if remote_mempool.size > guard.mempool.len() {
                    let verified: Vec<Transaction> = remote_mempool
                        .mempool
                        .into_iter()
                        .filter(|t| self.tx_signature_ok(t))
                        .collect();
                    let added = guard.mempool.merge_new(verified);
                    if added > 0 {
                        let fresh: Vec<Transaction> = guard
                            .mempool
                            .as_slice()
                            .iter()
                            .rev()
                            .take(added)
                            .cloned()
                            .collect();
                        for tx in fresh {
                            if let Err(e) = self.store.insert_mempool_tx(&tx) {
                                tracing::error!("persistence failure merging mempool during sync: {e}");
                            }
                        }
                    }
                }
            }

            if let Ok(remote_nodes) = self.peer_client.get_nodes(peer).await {
                let mut guard = self.state.lock().await;
                for node in remote_nodes.nodes {
                    if node != self.self_url && guard.peers.insert(node.clone()) {
                        if let Err(e) = self.store.insert_peer(&node) {
                            tracing::error!("persistence failure adding discovered peer: {e}");
                        }
                    }
                }
            }
        }
    }

    fn tx_signature_ok(&self, tx: &Transaction) -> bool {
        match &tx.signature {
            None => true,
            Some(sig) => {
                let message = match tx.canonical_signed_bytes() {
                    Ok(bytes) => bytes,
                    Err(_) => return false,
                };
                self.keys.verify(&tx.actor, &message, sig).unwrap_or(false)
            }
        }
    }
}

fn server_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let secs = now.as_secs();
    let millis = now.subsec_millis();
    format!("{secs}.{millis:03}")
}
