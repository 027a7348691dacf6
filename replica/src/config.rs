//! Replica configuration: command-line flags and the engine settings
//! derived from them.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use chain::ChainConfig;

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
pub enum StorageBackend {
    Sqlite,
    File,
}

/// Command-line flags for one replica node.
#[derive(Parser, Debug)]
#[command(name = "replica", about = "Supply-chain ledger replica node")]
pub struct Cli {
    /// Port to listen on.
    #[arg(long, default_value_t = 8081)]
    pub port: u16,

    /// Hostname this replica advertises to peers (used to build its
    /// own base URL and as its entry in the leader-election priority
    /// list).
    #[arg(long, default_value = "127.0.0.1")]
    pub hostname: String,

    /// Comma-separated base URLs of peers to bootstrap from, e.g.
    /// `http://host-a:8081,http://host-b:8081`.
    #[arg(long, value_delimiter = ',')]
    pub bootstrap: Vec<String>,

    /// Leading hex zeros a mined block's hash must have.
    #[arg(long, default_value_t = 2)]
    pub difficulty: u32,

    /// Disables signature verification on admitted transactions.
    #[arg(long)]
    pub no_crypto: bool,

    /// Disables the background mining daemon; blocks are only produced
    /// by an explicit `POST /mine`.
    #[arg(long)]
    pub no_auto_mine: bool,

    /// Directory for persisted chain/mempool/peer state.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory for actor RSA keypairs.
    #[arg(long, default_value = "keys")]
    pub key_dir: PathBuf,

    /// Persistence backend.
    #[arg(long, value_enum, default_value_t = StorageBackend::Sqlite)]
    pub storage: StorageBackend,
}

/// Fully resolved configuration a replica runs with.
pub struct ReplicaConfig {
    pub listen_addr: SocketAddr,
    pub self_url: String,
    pub bootstrap_peers: Vec<String>,
    pub data_dir: PathBuf,
    pub key_dir: PathBuf,
    pub storage: StorageBackend,
    pub auto_mine: bool,
    pub chain: ChainConfig,
}

impl ReplicaConfig {
    pub fn from_cli(cli: Cli) -> Self {
        let listen_addr: SocketAddr = format!("0.0.0.0:{}", cli.port)
            .parse()
            .expect("port-derived listen address should always parse");
        let self_url = format!("http://{}:{}", cli.hostname, cli.port);

        let mut chain = ChainConfig::default();
        chain.difficulty = cli.difficulty;
        chain.crypto_enabled = !cli.no_crypto;

        ReplicaConfig {
            listen_addr,
            self_url,
            bootstrap_peers: cli.bootstrap,
            data_dir: cli.data_dir,
            key_dir: cli.key_dir,
            storage: cli.storage,
            auto_mine: !cli.no_auto_mine,
            chain,
        }
    }
}
