// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retrier: the public entry point.
//!
//! A [`Retrier`] owns a [`Coordinator`] and one worker thread. The worker
//! runs startup recovery (in-flight keys back to pending, then eviction of
//! dead entries) and every drain, so drains never overlap. Callers use
//! [`Retrier::execute`] on the request path: failed requests are queued and
//! the original outcome is returned unchanged.
//!
//! Until startup recovery finishes, [`Retrier::execute`] waits (bounded by
//! `init_timeout`). If recovery panics or the wait times out, requests pass
//! straight through to the transport without being queued.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::clock::{ClockSource, SystemClock};
use crate::codec::Codec;
use crate::config::RetryConfig;
use crate::connectivity::{AlwaysOnline, Connectivity};
use crate::coordinator::{Coordinator, DrainReport};
use crate::error::{Error, Result};
use crate::listener::{Dispatch, InlineDispatcher, Listeners, Notifier, RetryListener};
use crate::request::{HttpRequest, RetryableRequest};
use crate::store::ByteStore;
use crate::transport::{DefaultPolicy, HttpResponse, RetryPolicy, Transport, TransportError};

const WORKER_THREAD_NAME: &str = "rq-worker";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Pending,
    Ready,
    Failed,
}

/// One-shot startup signal.
pub struct Readiness {
    state: Mutex<InitState>,
    cond: Condvar,
}

impl Readiness {
    pub fn new() -> Self {
        Readiness { state: Mutex::new(InitState::Pending), cond: Condvar::new() }
    }

    /// Settles the signal. Only the first call has an effect.
    pub fn set(&self, outcome: InitState) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state == InitState::Pending {
            *state = outcome;
            self.cond.notify_all();
        }
    }

    pub fn state(&self) -> InitState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Waits until settled or `timeout` elapses; returns the state seen last.
    pub fn wait(&self, timeout: Option<Duration>) -> InitState {
        let guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let pending = |s: &mut InitState| *s == InitState::Pending;
        match timeout {
            Some(timeout) => {
                let (guard, _) = self
                    .cond
                    .wait_timeout_while(guard, timeout, pending)
                    .unwrap_or_else(|e| e.into_inner());
                *guard
            }
            None => *self.cond.wait_while(guard, pending).unwrap_or_else(|e| e.into_inner()),
        }
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}

/// Rate limit and connectivity gate for triggered drains.
pub struct DrainTrigger {
    min_interval_ms: u64,
    last_drain_at: Mutex<Option<u64>>,
}

impl DrainTrigger {
    pub fn new(min_interval: Duration, last_drain_at: Option<u64>) -> Self {
        DrainTrigger {
            min_interval_ms: min_interval.as_millis() as u64,
            last_drain_at: Mutex::new(last_drain_at),
        }
    }

    /// Claims a drain at `now_ms`.
    ///
    /// Refused when the previous drain was less than the minimum interval
    /// ago, or when `is_online` says the network is down. `is_online` is only
    /// consulted once the interval check passes.
    pub fn claim(&self, now_ms: u64, is_online: impl FnOnce() -> bool) -> bool {
        let mut last = self.last_drain_at.lock().unwrap_or_else(|e| e.into_inner());
        if last.is_some_and(|prev| now_ms.saturating_sub(prev) < self.min_interval_ms) {
            return false;
        }
        if !is_online() {
            return false;
        }
        *last = Some(now_ms);
        true
    }

    /// Records a drain that bypassed the gate.
    pub fn record(&self, now_ms: u64) {
        *self.last_drain_at.lock().unwrap_or_else(|e| e.into_inner()) = Some(now_ms);
    }

    pub fn last_drain_at(&self) -> Option<u64> {
        *self.last_drain_at.lock().unwrap_or_else(|e| e.into_inner())
    }
}

enum Job {
    Init,
    Drain(Option<Sender<DrainReport>>),
    Shutdown,
}

struct Shared {
    coordinator: Coordinator,
    readiness: Readiness,
}

pub struct RetrierBuilder {
    store: Arc<dyn ByteStore>,
    transport: Arc<dyn Transport>,
    config: RetryConfig,
    policy: Arc<dyn RetryPolicy>,
    connectivity: Arc<dyn Connectivity>,
    clock: Arc<dyn ClockSource>,
    dispatcher: Arc<dyn Dispatch>,
    codec: Option<Box<dyn Codec<RetryableRequest>>>,
    last_drain_at: Option<u64>,
}

impl RetrierBuilder {
    pub fn config(mut self, config: RetryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn policy(mut self, policy: Arc<dyn RetryPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn ClockSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Context listener callbacks run on. Defaults to the worker thread.
    pub fn dispatcher(mut self, dispatcher: Arc<dyn Dispatch>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn codec(mut self, codec: Box<dyn Codec<RetryableRequest>>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Seeds the rate limiter with a drain that happened before this retrier
    /// existed.
    pub fn last_drain_at(mut self, at_ms: Option<u64>) -> Self {
        self.last_drain_at = at_ms;
        self
    }

    /// Starts the worker and schedules startup recovery.
    pub fn build(self) -> Result<Retrier> {
        let listeners = Arc::new(Listeners::new());
        let notifier = Notifier::new(Arc::clone(&listeners), self.dispatcher);
        let mut coordinator = Coordinator::new(self.store, self.transport)
            .with_policy(self.policy)
            .with_clock(Arc::clone(&self.clock))
            .with_notifier(notifier);
        if let Some(codec) = self.codec {
            coordinator = coordinator.with_codec(codec);
        }

        let shared = Arc::new(Shared { coordinator, readiness: Readiness::new() });
        let (tx, rx) = mpsc::channel();
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name(WORKER_THREAD_NAME.into())
            .spawn(move || run_worker(&worker_shared, rx))?;
        tx.send(Job::Init).map_err(|_| Error::Worker("worker exited during startup".into()))?;

        Ok(Retrier {
            trigger: DrainTrigger::new(self.config.min_interval, self.last_drain_at),
            config: self.config,
            connectivity: self.connectivity,
            clock: self.clock,
            listeners,
            shared,
            tx: Some(tx),
            worker: Some(worker),
        })
    }
}

pub struct Retrier {
    config: RetryConfig,
    connectivity: Arc<dyn Connectivity>,
    clock: Arc<dyn ClockSource>,
    listeners: Arc<Listeners>,
    trigger: DrainTrigger,
    shared: Arc<Shared>,
    tx: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl Retrier {
    pub fn builder(store: Arc<dyn ByteStore>, transport: Arc<dyn Transport>) -> RetrierBuilder {
        RetrierBuilder {
            store,
            transport,
            config: RetryConfig::default(),
            policy: Arc::new(DefaultPolicy),
            connectivity: Arc::new(AlwaysOnline),
            clock: Arc::new(SystemClock),
            dispatcher: Arc::new(InlineDispatcher),
            codec: None,
            last_drain_at: None,
        }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Queue inspection and maintenance.
    pub fn coordinator(&self) -> &Coordinator {
        &self.shared.coordinator
    }

    pub fn init_state(&self) -> InitState {
        self.shared.readiness.state()
    }

    /// Waits for startup recovery, bounded by `init_timeout`.
    pub fn wait_ready(&self) -> InitState {
        self.shared.readiness.wait(self.config.init_timeout)
    }

    fn is_ready(&self) -> bool {
        match self.wait_ready() {
            InitState::Ready => true,
            state => {
                debug!(?state, "retrier not ready, passing request through");
                false
            }
        }
    }

    /// Executes `request`, queueing it for retry when it fails.
    ///
    /// A transport error or a response the policy rejects causes the request
    /// to be queued; the outcome is returned to the caller either way.
    /// Requests the policy deems not retryable, and all requests while the
    /// retrier is not ready, go straight to the transport.
    pub fn execute(
        &self,
        request: &HttpRequest,
    ) -> std::result::Result<HttpResponse, TransportError> {
        let coordinator = &self.shared.coordinator;
        if !self.is_ready() || !coordinator.policy().is_retryable(request) {
            return coordinator.transport().execute(request);
        }

        let outcome = coordinator.transport().execute(request);
        let delivered = match &outcome {
            Ok(response) => coordinator.policy().is_success(request, response),
            Err(_) => false,
        };
        if !delivered {
            self.store(request);
        }
        outcome
    }

    /// Queues `request` without executing it.
    pub fn enqueue(&self, request: &HttpRequest) -> Option<String> {
        if !self.is_ready() {
            return None;
        }
        self.store(request)
    }

    fn store(&self, request: &HttpRequest) -> Option<String> {
        let retryable = RetryableRequest::new(
            request.clone(),
            self.config.life,
            self.config.max_attempts,
            self.clock.now_ms(),
        );
        let fingerprint = retryable.fingerprint();
        self.shared.coordinator.enqueue(&retryable).then_some(fingerprint)
    }

    /// Schedules a drain on the worker if the rate limit and connectivity
    /// allow it. Returns whether a drain was scheduled.
    pub fn trigger(&self) -> bool {
        let now = self.clock.now_ms();
        if !self.trigger.claim(now, || self.connectivity.is_online()) {
            debug!("drain trigger refused");
            return false;
        }
        self.send(Job::Drain(None))
    }

    /// Like [`trigger`](Self::trigger), but waits for the drain to finish.
    /// Returns `None` when the trigger was refused.
    pub fn trigger_blocking(&self) -> Result<Option<DrainReport>> {
        let now = self.clock.now_ms();
        if !self.trigger.claim(now, || self.connectivity.is_online()) {
            return Ok(None);
        }
        self.run_drain().map(Some)
    }

    /// Drains now, ignoring rate limit and connectivity, and waits for it.
    pub fn drain_now(&self) -> Result<DrainReport> {
        self.trigger.record(self.clock.now_ms());
        self.run_drain()
    }

    pub fn last_drain_at(&self) -> Option<u64> {
        self.trigger.last_drain_at()
    }

    fn run_drain(&self) -> Result<DrainReport> {
        let (reply_tx, reply_rx) = mpsc::channel();
        if !self.send(Job::Drain(Some(reply_tx))) {
            return Err(Error::Worker("worker is not running".into()));
        }
        reply_rx.recv().map_err(|_| Error::Worker("worker exited during drain".into()))
    }

    fn send(&self, job: Job) -> bool {
        let sent = self.tx.as_ref().is_some_and(|tx| tx.send(job).is_ok());
        if !sent {
            warn!("worker is gone");
        }
        sent
    }

    /// Registers a listener. Returns false if it was already registered.
    pub fn add_listener(&self, listener: Arc<dyn RetryListener>) -> bool {
        self.listeners.add(listener)
    }

    /// Unregisters a listener. Returns false if it was not registered.
    pub fn remove_listener(&self, listener: &Arc<dyn RetryListener>) -> bool {
        self.listeners.remove(listener)
    }
}

impl Drop for Retrier {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Job::Shutdown);
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_worker(shared: &Shared, rx: Receiver<Job>) {
    for job in rx {
        match job {
            Job::Init => {
                let started = Instant::now();
                let result = catch_unwind(AssertUnwindSafe(|| {
                    let recovered = shared.coordinator.recover_in_flight();
                    let evicted = shared.coordinator.evict_dead();
                    (recovered, evicted)
                }));
                match result {
                    Ok((recovered, evicted)) => {
                        info!(
                            recovered,
                            evicted,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "retry queue ready"
                        );
                        shared.readiness.set(InitState::Ready);
                    }
                    Err(_) => {
                        warn!("retry queue startup failed, requests will pass through");
                        shared.readiness.set(InitState::Failed);
                    }
                }
            }
            Job::Drain(reply) => {
                let report = catch_unwind(AssertUnwindSafe(|| shared.coordinator.drain()))
                    .unwrap_or_else(|_| {
                        warn!("drain panicked");
                        DrainReport::default()
                    });
                if let Some(reply) = reply {
                    let _ = reply.send(report);
                }
            }
            Job::Shutdown => break,
        }
    }
    debug!("worker stopped");
}

#[cfg(test)]
#[path = "retrier_tests.rs"]
mod tests;
