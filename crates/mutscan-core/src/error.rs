use std::path::PathBuf;

use thiserror::Error;

/// Failure of the external metadata reader for a single file.
///
/// Never escapes a batch: the orchestrator turns it into a
/// `stripped` / `Read Error` inventory result.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read metadata for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed metadata for {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("cannot start a batch scan with an empty file list")]
    EmptyBatch,

    #[error("scan worker is no longer running")]
    WorkerGone,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("invalid range segment: {0:?}")]
    InvalidSegment(String),

    #[error("descending range: {lo}-{hi}")]
    Descending { lo: u64, hi: u64 },

    #[error("range expands to more than {limit} numbers")]
    TooLarge { limit: usize },
}

pub type Result<T> = std::result::Result<T, InventoryError>;
