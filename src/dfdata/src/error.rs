//! Error types for loading, transforming, and writing item data.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors for a batch run.
///
/// Anything in here aborts the current job. Recoverable anomalies (orphaned
/// relations, collisions, per-item fetch failures) are collected into
/// reports instead.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected shape in {}: {reason}", .path.display())]
    Shape { path: PathBuf, reason: String },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Per-item image fetch failure. Never aborts a batch.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = DataError> = std::result::Result<T, E>;
