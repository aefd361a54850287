pub mod board_io;
pub mod config_io;
pub mod state_io;
pub mod storage;

use std::path::PathBuf;

pub use storage::{FileStorage, MemoryStorage, Storage, StorageKey};

/// Error type for loading and saving persisted documents
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {key}: {source}")]
    Parse {
        key: StorageKey,
        source: serde_json::Error,
    },
    #[error("could not serialize {key}: {source}")]
    Serialize {
        key: StorageKey,
        source: serde_json::Error,
    },
    #[error("{key} is not a valid document: {reason}")]
    Invalid { key: StorageKey, reason: &'static str },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
