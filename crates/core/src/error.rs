// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for rq-core operations.

use thiserror::Error;

/// All possible errors that can occur in rq-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid storage key: '{0}'\n  hint: keys must be non-empty and may not contain path separators")]
    InvalidKey(String),

    #[error("invalid config item '{0}'\n  hint: names may not contain ':' and neither names nor values may span lines")]
    InvalidConfigItem(String),

    #[error("queue directory is owned by another process: {0}")]
    StoreLocked(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("worker error: {0}")]
    Worker(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for rq-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
