//! Error types for the feed pipeline.
//!
//! None of these ever reach an HTTP client: feed errors degrade to an empty
//! [`FeatureCollection`](crate::geojson::FeatureCollection) and snapshot
//! errors are only logged.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while retrieving or decoding the upstream feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("invalid feed source '{input}': {reason}")]
    InvalidSource { input: String, reason: String },

    #[error("feed request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("feed returned HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to read feed file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode feed: {0}")]
    Decode(#[from] prost::DecodeError),
}

impl FeedError {
    /// Short label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::Decode(_) => "decode_failure",
            _ => "upstream_unavailable",
        }
    }
}

/// Failure while writing the snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to create snapshot directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize feature collection: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write snapshot {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to replace snapshot {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

impl SnapshotError {
    pub fn kind(&self) -> &'static str {
        "persistence_failure"
    }
}
