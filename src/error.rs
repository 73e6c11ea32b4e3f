use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure to turn one source URL into feed entries.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed feed: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode snapshot {path}: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
