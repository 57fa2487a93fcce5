use std::path::PathBuf;

use planner_core::NextDateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access task store {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("task store {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("task store {path} holds a task without an id")]
    MissingTaskId { path: PathBuf },
    #[error("task ids are exhausted")]
    IdsExhausted,
    #[error("failed to encode task store: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no title")]
    MissingTitle,
    #[error("task {0} not found")]
    NotFound(u64),
    #[error("task id is missing")]
    MissingId,
    #[error("task id `{0}` is not a number")]
    InvalidId(String),
    #[error(transparent)]
    Date(#[from] NextDateError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
