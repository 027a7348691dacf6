// chain/src/error.rs

use std::fmt;

use crate::keys::KeyError;
use crate::replication::PeerClientError;
use crate::storage::StorageError;
use crate::validation::ValidationError;

/// Top-level error for the `chain` crate, composing the per-module
/// error types via `From`.
#[derive(Debug)]
pub enum ChainError {
    Validation(ValidationError),
    Storage(StorageError),
    Key(KeyError),
    Peer(PeerClientError),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::Validation(e) => write!(f, "{e}"),
            ChainError::Storage(e) => write!(f, "{e}"),
            ChainError::Key(e) => write!(f, "{e}"),
            ChainError::Peer(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<ValidationError> for ChainError {
    fn from(e: ValidationError) -> Self {
        ChainError::Validation(e)
    }
}

impl From<StorageError> for ChainError {
    fn from(e: StorageError) -> Self {
        ChainError::Storage(e)
    }
}

impl From<KeyError> for ChainError {
    fn from(e: KeyError) -> Self {
        ChainError::Key(e)
    }
}

impl From<PeerClientError> for ChainError {
    fn from(e: PeerClientError) -> Self {
        ChainError::Peer(e)
    }
}
