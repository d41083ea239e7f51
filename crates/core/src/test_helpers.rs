// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test doubles for core module tests.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::listener::{RetryEvent, RetryListener};
use crate::request::{HttpRequest, RetryableRequest};
use crate::store::{ByteStore, MemoryStore};
use crate::transport::{HttpResponse, Transport, TransportError};

pub const NOW: u64 = 1_700_000_000_000;

pub fn request(url: &str) -> HttpRequest {
    HttpRequest::new("GET", url).unwrap()
}

pub fn retryable(url: &str, max_attempts: Option<u32>) -> RetryableRequest {
    RetryableRequest::new(
        request(url),
        Some(std::time::Duration::from_secs(3600)),
        max_attempts,
        NOW,
    )
}

type Hook = Box<dyn Fn(&HttpRequest) + Send + Sync>;

/// Transport that answers from a script, then falls back to a fixed reply.
pub struct StubTransport {
    script: Mutex<VecDeque<std::result::Result<HttpResponse, TransportError>>>,
    fallback: std::result::Result<HttpResponse, TransportError>,
    calls: Mutex<Vec<HttpRequest>>,
    hook: Mutex<Option<Hook>>,
}

impl StubTransport {
    pub fn status(status: u16) -> Self {
        Self::with_fallback(Ok(HttpResponse::new(status)))
    }

    pub fn refusing() -> Self {
        Self::with_fallback(Err(TransportError::Connect("connection refused".into())))
    }

    fn with_fallback(fallback: std::result::Result<HttpResponse, TransportError>) -> Self {
        StubTransport {
            script: Mutex::new(VecDeque::new()),
            fallback,
            calls: Mutex::new(Vec::new()),
            hook: Mutex::new(None),
        }
    }

    /// Queues a one-off reply ahead of the fallback.
    pub fn then(self, reply: std::result::Result<HttpResponse, TransportError>) -> Self {
        self.script.lock().unwrap().push_back(reply);
        self
    }

    /// Runs `hook` inside every execute call, before replying.
    pub fn on_execute(&self, hook: impl Fn(&HttpRequest) + Send + Sync + 'static) {
        *self.hook.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Transport for StubTransport {
    fn execute(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        if let Some(hook) = self.hook.lock().unwrap().as_ref() {
            hook(request);
        }
        self.calls.lock().unwrap().push(request.clone());
        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Listener that keeps every event it sees.
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<RetryEvent>>,
}

impl RecordingListener {
    pub fn events(&self) -> Vec<RetryEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(RetryEvent::kind).collect()
    }
}

impl RetryListener for RecordingListener {
    fn on_event(&self, event: &RetryEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Memory store with switchable faults.
///
/// `fail(op)` makes the named operation return an I/O error; `panic_on(op)`
/// makes it panic.
#[derive(Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    failing: Mutex<HashSet<&'static str>>,
    panicking: Mutex<HashSet<&'static str>>,
}

impl FaultyStore {
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn heal(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    pub fn panic_on(&self, op: &'static str) {
        self.panicking.lock().unwrap().insert(op);
    }

    fn check(&self, op: &'static str) -> Result<()> {
        if self.panicking.lock().unwrap().contains(op) {
            panic!("injected {op} panic");
        }
        if self.failing.lock().unwrap().contains(op) {
            return Err(Error::Io(std::io::Error::other(format!("injected {op} fault"))));
        }
        Ok(())
    }
}

impl ByteStore for FaultyStore {
    fn put(&self, key: &str, content: &str) -> Result<()> {
        self.check("put")?;
        self.inner.put(key, content)
    }

    fn append(&self, key: &str, content: &str) -> Result<()> {
        self.check("append")?;
        self.inner.append(key, content)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.check("delete")?;
        self.inner.delete(key)
    }

    fn rename(&self, src: &str, dst: &str) -> Result<()> {
        self.check("rename")?;
        self.inner.rename(src, dst)
    }

    fn clear(&self) -> Result<()> {
        self.check("clear")?;
        self.inner.clear()
    }

    fn has(&self, key: &str) -> bool {
        self.inner.has(key)
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check("get")?;
        self.inner.get(key)
    }

    fn size(&self, key: &str) -> Result<u64> {
        self.check("size")?;
        self.inner.size(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.check("keys")?;
        self.inner.keys()
    }

    fn version(&self) -> u32 {
        self.inner.version()
    }

    fn storage_dir(&self) -> Option<&Path> {
        None
    }

    fn backup(&self, key: &str) -> Result<()> {
        self.inner.backup(key)
    }

    fn remove_backup(&self, key: &str) -> Result<()> {
        self.inner.remove_backup(key)
    }

    fn recover(&self, key: &str) -> Result<()> {
        self.inner.recover(key)
    }
}
