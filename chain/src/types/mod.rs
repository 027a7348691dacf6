//! Core domain types used by the chain.
//!
//! This module defines the hash wrapper, the workflow `Action` enum, the
//! `Transaction`/`Block`/`Chain` data model, and the canonical JSON
//! encoding shared by hashing and signing.

pub mod action;
pub mod block;
pub mod hash;
pub mod tx;

pub use action::Action;
pub use block::{Block, Chain, GENESIS_PREVIOUS_HASH};
pub use hash::{CanonicalizeError, Hash256};
pub use tx::Transaction;
