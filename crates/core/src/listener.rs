// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Outcome notifications.
//!
//! Every drain step ends in exactly one [`RetryEvent`]. Events go to the
//! registered listeners in registration order, on whatever context the
//! configured [`Dispatch`] implementation chooses.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::warn;

use crate::request::HttpRequest;
use crate::transport::{HttpResponse, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryEvent {
    /// Replay was accepted by the policy; the entry is gone.
    Succeeded { request: HttpRequest, response: HttpResponse },
    /// Replay failed before a response arrived; the entry is pending again.
    Errored { request: HttpRequest, error: TransportError },
    /// Replay got a response the policy did not accept; the entry is pending again.
    Rejected { request: HttpRequest, response: HttpResponse },
    /// Entry dropped for good: expired, out of attempts, or stored under a foreign key.
    Aborted { request: HttpRequest, deadline_ms: Option<u64>, attempts: u32 },
}

impl RetryEvent {
    pub fn request(&self) -> &HttpRequest {
        match self {
            RetryEvent::Succeeded { request, .. }
            | RetryEvent::Errored { request, .. }
            | RetryEvent::Rejected { request, .. }
            | RetryEvent::Aborted { request, .. } => request,
        }
    }

    /// Short lowercase name, used in logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            RetryEvent::Succeeded { .. } => "succeeded",
            RetryEvent::Errored { .. } => "errored",
            RetryEvent::Rejected { .. } => "rejected",
            RetryEvent::Aborted { .. } => "aborted",
        }
    }
}

pub trait RetryListener: Send + Sync {
    fn on_event(&self, event: &RetryEvent);
}

impl<F> RetryListener for F
where
    F: Fn(&RetryEvent) + Send + Sync,
{
    fn on_event(&self, event: &RetryEvent) {
        self(event)
    }
}

/// Registered listeners. Each listener is held at most once.
#[derive(Default)]
pub struct Listeners {
    inner: Mutex<Vec<Arc<dyn RetryListener>>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`. Returns false if it was already registered.
    pub fn add(&self, listener: Arc<dyn RetryListener>) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.iter().any(|l| same(l, &listener)) {
            return false;
        }
        inner.push(listener);
        true
    }

    /// Unregisters `listener`. Returns false if it was not registered.
    pub fn remove(&self, listener: &Arc<dyn RetryListener>) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let before = inner.len();
        inner.retain(|l| !same(l, listener));
        inner.len() != before
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<Arc<dyn RetryListener>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

// Compare data pointers only; vtable pointers are not unique per type.
fn same(a: &Arc<dyn RetryListener>, b: &Arc<dyn RetryListener>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Where listener callbacks run.
pub trait Dispatch: Send + Sync {
    fn dispatch(&self, job: Job);
}

/// Runs callbacks on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineDispatcher;

impl Dispatch for InlineDispatcher {
    fn dispatch(&self, job: Job) {
        job()
    }
}

/// Runs callbacks in order on one dedicated thread.
///
/// Dropping the dispatcher delivers everything already queued, then joins
/// the thread.
pub struct ThreadDispatcher {
    tx: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadDispatcher {
    pub fn new() -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel::<Job>();
        let handle = thread::Builder::new().name("rq-events".into()).spawn(move || {
            for job in rx {
                job();
            }
        })?;
        Ok(ThreadDispatcher { tx: Some(tx), handle: Some(handle) })
    }

    /// Blocks until every job dispatched so far has run.
    pub fn flush(&self) {
        let (done_tx, done_rx) = mpsc::channel();
        self.dispatch(Box::new(move || {
            let _ = done_tx.send(());
        }));
        let _ = done_rx.recv();
    }
}

impl Dispatch for ThreadDispatcher {
    fn dispatch(&self, job: Job) {
        let sent = self.tx.as_ref().is_some_and(|tx| tx.send(job).is_ok());
        if !sent {
            warn!("event delivery thread is gone, dropping notification");
        }
    }
}

impl Drop for ThreadDispatcher {
    fn drop(&mut self) {
        drop(self.tx.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Fans events out to listeners through a dispatcher.
#[derive(Clone)]
pub struct Notifier {
    listeners: Arc<Listeners>,
    dispatcher: Arc<dyn Dispatch>,
}

impl Notifier {
    pub fn new(listeners: Arc<Listeners>, dispatcher: Arc<dyn Dispatch>) -> Self {
        Notifier { listeners, dispatcher }
    }

    pub fn listeners(&self) -> &Arc<Listeners> {
        &self.listeners
    }

    pub fn notify(&self, event: RetryEvent) {
        let listeners = self.listeners.snapshot();
        if listeners.is_empty() {
            return;
        }
        self.dispatcher.dispatch(Box::new(move || {
            for listener in listeners {
                let delivered = catch_unwind(AssertUnwindSafe(|| listener.on_event(&event)));
                if delivered.is_err() {
                    warn!(event = event.kind(), "listener panicked");
                }
            }
        }));
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Notifier::new(Arc::new(Listeners::new()), Arc::new(InlineDispatcher))
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
