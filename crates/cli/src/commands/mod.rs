// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod clear;
pub mod config;
pub mod drain;
pub mod enqueue;
pub mod list;
pub mod remove;
pub mod send;

use std::sync::Arc;

use rq_core::{
    Connectivity, FileStore, HttpRequest, InitState, QueueEntry, ReqwestTransport, Retrier,
};
use tracing::{debug, warn};

use crate::cli::RequestArgs;
use crate::config::{Config, DrainState, QueueDir};
use crate::error::{Error, Result};

/// An open queue directory with a running retrier.
pub(crate) struct Session {
    pub dir: QueueDir,
    pub state: DrainState,
    pub retrier: Retrier,
}

impl Session {
    /// Persists the retrier's last drain time so the next invocation honors
    /// the minimum interval.
    pub fn save_drain_time(&self) -> Result<()> {
        match self.retrier.last_drain_at() {
            Some(at) => self.state.record_drain(at),
            None => Ok(()),
        }
    }
}

/// Opens the queue in `dir` and waits for startup recovery.
pub(crate) fn open_session(
    dir: &QueueDir,
    connectivity: Option<Arc<dyn Connectivity>>,
) -> Result<Session> {
    let config = Config::load(dir)?;
    let retry = config.retry_config()?;
    let store = FileStore::open(dir.store_path(), retry.store_version)?;
    let transport =
        ReqwestTransport::with_timeouts(config.connect_timeout(), config.request_timeout())?;
    let state = DrainState::open(dir);

    let mut builder = Retrier::builder(Arc::new(store), Arc::new(transport))
        .config(retry)
        .last_drain_at(state.last_drain()?);
    if let Some(connectivity) = connectivity {
        builder = builder.connectivity(connectivity);
    }
    let retrier = builder.build()?;

    match retrier.wait_ready() {
        InitState::Ready => debug!(dir = %dir.root().display(), "queue ready"),
        state => warn!(?state, "queue recovery did not finish"),
    }
    Ok(Session { dir: dir.clone(), state, retrier })
}

/// Parses a `Name: value` header argument.
pub(crate) fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw.split_once(':').ok_or_else(|| Error::InvalidHeader(raw.to_string()))?;
    let name = name.trim();
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(Error::InvalidHeader(raw.to_string()));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Builds the request described by the command line arguments.
pub(crate) fn build_request(args: &RequestArgs) -> Result<HttpRequest> {
    let mut request = HttpRequest::new(&args.method, &args.url)?;
    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        request = request.with_header(name, value);
    }
    if let Some(data) = &args.data {
        request = request.with_body(args.content_type.as_deref(), data.as_bytes());
    }
    Ok(request)
}

/// Resolves a fingerprint or unique fingerprint prefix against the queued
/// entries.
pub(crate) fn resolve_fingerprint(entries: Vec<QueueEntry>, prefix: &str) -> Result<String> {
    let mut matches: Vec<String> = entries
        .into_iter()
        .map(|entry| entry.fingerprint)
        .filter(|fp| fp.starts_with(prefix))
        .collect();
    matches.sort();
    matches.dedup();
    match matches.len() {
        0 => Err(Error::NotFound(prefix.to_string())),
        1 => Ok(matches.remove(0)),
        _ => Err(Error::AmbiguousFingerprint { prefix: prefix.to_string(), matches }),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
