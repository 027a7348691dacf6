// replica/src/main.rs

//! Replica binary.
//!
//! This binary exposes the full HTTP surface of one supply-chain
//! ledger replica on top of the `chain` crate's embedded engine:
//! transaction admission and forwarding, mining, block replication,
//! chain/mempool/peer introspection, batch history and verification,
//! peer registration, forced resync, and actor key registration. It
//! embeds a persistence backend (SQLite or JSON files), a key registry,
//! a workflow validator, and two background daemons (mining, sync).

mod config;
mod daemons;
mod metrics;
mod routes;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use clap::Parser;
use tokio::signal;

use chain::{FileStore, KeyRegistry, SqliteStore, Store};
use config::{Cli, ReplicaConfig, StorageBackend};
use state::Node;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "replica=info,chain=info".to_string()))
        .init();

    let cli = Cli::parse();
    let replica_cfg = ReplicaConfig::from_cli(cli);

    if let Err(e) = run(replica_cfg).await {
        eprintln!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: ReplicaConfig) -> Result<(), String> {
    // ---------------------------
    // Persistence
    // ---------------------------

    std::fs::create_dir_all(&cfg.data_dir)
        .map_err(|e| format!("failed to create data directory {:?}: {e}", cfg.data_dir))?;

    let store: Box<dyn Store> = match cfg.storage {
        StorageBackend::Sqlite => {
            let path = cfg.data_dir.join("ledger.sqlite3");
            Box::new(
                SqliteStore::open(path.to_str().ok_or("data_dir path is not valid UTF-8")?)
                    .map_err(|e| format!("failed to open sqlite store at {path:?}: {e}"))?,
            )
        }
        StorageBackend::File => {
            let tag = cfg.listen_addr.port().to_string();
            Box::new(
                FileStore::open(&cfg.data_dir, &tag)
                    .map_err(|e| format!("failed to open file store in {:?}: {e}", cfg.data_dir))?,
            )
        }
    };

    // ---------------------------
    // Keys
    // ---------------------------

    let keys = Arc::new(
        KeyRegistry::new(cfg.key_dir.clone())
            .map_err(|e| format!("failed to open key registry at {:?}: {e}", cfg.key_dir))?,
    );

    // ---------------------------
    // Node state
    // ---------------------------

    let node = Arc::new(
        Node::new(store, keys, cfg.chain.clone(), cfg.self_url.clone(), cfg.bootstrap_peers.clone())
            .map_err(|e| format!("failed to initialise node state: {e}"))?,
    );

    // ---------------------------
    // Bootstrap: register with seed peers, pull their peer lists, then
    // run one synchronous cycle before marking this replica ready.
    // ---------------------------

    if !cfg.bootstrap_peers.is_empty() {
        let bootstrap_node = node.clone();
        let bootstrap_peers = cfg.bootstrap_peers.clone();
        tokio::spawn(async move {
            bootstrap_node.bootstrap_with_peers(&bootstrap_peers).await;
            bootstrap_node.sync_once().await;
            bootstrap_node.mark_ready();
            tracing::info!("bootstrap sync complete, replica is ready");
        });
    }

    // ---------------------------
    // Background daemons
    // ---------------------------

    if cfg.auto_mine {
        let mining_node = node.clone();
        tokio::spawn(async move {
            daemons::run_mining_daemon(mining_node).await;
        });
    }

    let sync_node = node.clone();
    let sync_interval = cfg.chain.sync_interval;
    let sync_warmup = cfg.chain.sync_warmup;
    tokio::spawn(async move {
        daemons::run_sync_daemon(sync_node, sync_interval, sync_warmup).await;
    });

    // ---------------------------
    // HTTP router
    // ---------------------------

    let app = Router::new()
        .route("/status", get(routes::status::status))
        .route("/add-transaction", post(routes::transactions::add_transaction))
        .route("/receive-transaction", post(routes::transactions::receive_transaction))
        .route("/mine", post(routes::mining::mine))
        .route("/receive-block", post(routes::blocks::receive_block))
        .route("/chain", get(routes::blocks::chain))
        .route("/mempool", get(routes::mempool::mempool))
        .route("/history/{batch_id}", get(routes::history::history))
        .route("/verify/{batch_id}", get(routes::history::verify))
        .route("/nodes/register", post(routes::nodes::register))
        .route("/nodes", get(routes::nodes::list))
        .route("/sync", post(routes::nodes::sync))
        .route("/actors/register", post(routes::actors::register))
        .route("/actors", get(routes::actors::list))
        .route("/metrics", get(metrics::metrics))
        .with_state(node);

    tracing::info!("replica listening on http://{}", cfg.listen_addr);

    let listener = tokio::net::TcpListener::bind(cfg.listen_addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", cfg.listen_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("replica HTTP server error: {e}"))?;

    Ok(())
}

/// Waits for Ctrl-C and returns, used for graceful shutdown.
async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
