// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by the `rq` command line.
///
/// Messages are shown to the user verbatim, so they carry hints where a
/// common mistake is likely.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Queue(#[from] rq_core::Error),

    #[error("no queue directory\n  hint: pass --dir or set RQ_DIR")]
    NoQueueDir,

    #[error("invalid header '{0}'\n  hint: use 'Name: value'")]
    InvalidHeader(String),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("no queued request matches '{0}'\n  hint: run 'rq list' to see fingerprints")]
    NotFound(String),

    #[error("ambiguous fingerprint '{prefix}' matches: {}", matches.join(", "))]
    AmbiguousFingerprint { prefix: String, matches: Vec<String> },

    #[error("request failed: {0}\n  hint: it was queued for retry, run 'rq drain' later")]
    RequestFailed(String),

    #[error("request could not be queued\n  hint: check that the queue directory is writable")]
    NotQueued,

    #[error("transport setup failed: {0}")]
    Transport(#[from] rq_core::TransportError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    TomlParse(#[from] toml::de::Error),

    #[error(transparent)]
    TomlWrite(#[from] toml::ser::Error),
}

/// Result alias for the `rq` command line.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
