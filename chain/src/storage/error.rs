use std::fmt;

/// Persistence failures are treated as fatal per the spec: a replica
/// that cannot durably persist is considered corrupt.
#[derive(Debug)]
pub enum StorageError {
    Io(String),
    Sqlite(String),
    Corrupt(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(msg) => write!(f, "storage I/O error: {msg}"),
            StorageError::Sqlite(msg) => write!(f, "sqlite error: {msg}"),
            StorageError::Corrupt(msg) => write!(f, "corrupt persisted state: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}
