// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retry state machine.
//!
//! Every queued request lives under its fingerprint in one of two
//! namespaces:
//!
//! ```text
//! <fingerprint>            pending, waiting for the next drain
//! <fingerprint>.sending    in flight, owned by the drain that moved it
//! ```
//!
//! A drain step moves a pending key to its in-flight key (counting the
//! attempt), executes the request outside the lock, then either deletes the
//! in-flight key (delivered) or renames it back (retry later). At most one of
//! the two keys exists for a fingerprint at any time.
//!
//! All queue mutations go through one mutex. Storage faults are logged and
//! leave the previous state in place; nothing propagates to callers.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clock::{ClockSource, SystemClock};
use crate::codec::{Codec, JsonCodec};
use crate::listener::{Notifier, RetryEvent};
use crate::queue::RetryQueue;
use crate::request::RetryableRequest;
use crate::store::ByteStore;
use crate::transport::{DefaultPolicy, HttpResponse, RetryPolicy, Transport, TransportError};

/// Suffix marking the in-flight copy of a queued request.
pub const IN_FLIGHT_SUFFIX: &str = ".sending";

type RequestQueue = RetryQueue<RetryableRequest, Box<dyn Codec<RetryableRequest>>>;

pub fn in_flight_key(fingerprint: &str) -> String {
    format!("{fingerprint}{IN_FLIGHT_SUFFIX}")
}

pub fn is_in_flight_key(key: &str) -> bool {
    key.ends_with(IN_FLIGHT_SUFFIX)
}

/// Strips the in-flight suffix, if present.
pub fn pending_key(key: &str) -> &str {
    key.strip_suffix(IN_FLIGHT_SUFFIX).unwrap_or(key)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    Pending,
    InFlight,
}

/// One stored key, as seen by [`Coordinator::entries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub key: String,
    pub fingerprint: String,
    pub state: EntryState,
    /// `None` when nothing under the key decodes.
    pub request: Option<RetryableRequest>,
}

/// Tally of one drain pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// Requests handed to the transport.
    pub attempted: usize,
    pub succeeded: usize,
    /// Sent but not delivered; pending again.
    pub requeued: usize,
    /// Dropped as expired, out of attempts or mismatched.
    pub aborted: usize,
    /// Dropped because nothing under the key decoded.
    pub evicted: usize,
    /// Left alone: in flight elsewhere, or a storage fault.
    pub skipped: usize,
    /// Executed but could not be moved out of flight; picked up again by
    /// the next startup recovery.
    pub stranded: usize,
}

enum Step {
    Gone,
    Skipped,
    Evicted,
    Aborted(RetryEvent),
    Ready(RetryableRequest),
}

pub struct Coordinator {
    queue: Mutex<RequestQueue>,
    transport: Arc<dyn Transport>,
    policy: Arc<dyn RetryPolicy>,
    clock: Arc<dyn ClockSource>,
    notifier: Notifier,
}

impl Coordinator {
    /// Creates a coordinator with the JSON codec, the default policy, the
    /// system clock and no listeners.
    pub fn new(store: Arc<dyn ByteStore>, transport: Arc<dyn Transport>) -> Self {
        let codec: Box<dyn Codec<RetryableRequest>> = Box::new(JsonCodec::new());
        Coordinator {
            queue: Mutex::new(RetryQueue::new(store, codec)),
            transport,
            policy: Arc::new(DefaultPolicy),
            clock: Arc::new(SystemClock),
            notifier: Notifier::default(),
        }
    }

    pub fn with_codec(self, codec: Box<dyn Codec<RetryableRequest>>) -> Self {
        let store = Arc::clone(self.lock().store());
        Coordinator { queue: Mutex::new(RetryQueue::new(store, codec)), ..self }
    }

    pub fn with_policy(self, policy: Arc<dyn RetryPolicy>) -> Self {
        Coordinator { policy, ..self }
    }

    pub fn with_clock(self, clock: Arc<dyn ClockSource>) -> Self {
        Coordinator { clock, ..self }
    }

    pub fn with_notifier(self, notifier: Notifier) -> Self {
        Coordinator { notifier, ..self }
    }

    pub fn policy(&self) -> &Arc<dyn RetryPolicy> {
        &self.policy
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn clock(&self) -> &Arc<dyn ClockSource> {
        &self.clock
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    fn lock(&self) -> MutexGuard<'_, RequestQueue> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Stores `request` under its fingerprint, replacing any pending copy.
    ///
    /// If the same fingerprint is currently in flight the call coalesces into
    /// that attempt and writes nothing. Dead requests are not stored.
    pub fn enqueue(&self, request: &RetryableRequest) -> bool {
        if request.is_dead(self.clock.now_ms()) {
            debug!(url = %request.target().url, "not queueing dead request");
            return false;
        }
        let key = request.fingerprint();
        let queue = self.lock();
        if queue.has(&in_flight_key(&key)) {
            debug!(%key, "request already in flight, coalescing");
            return true;
        }
        let stored = queue.put(&key, request);
        if stored {
            debug!(%key, url = %request.target().url, "queued request");
        }
        stored
    }

    /// Runs one pass over every pending key.
    ///
    /// Each key present when the pass starts is attempted at most once. Keys
    /// already in flight are skipped.
    pub fn drain(&self) -> DrainReport {
        let mut report = DrainReport::default();
        let keys = match self.lock().try_keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "cannot list queue, skipping drain");
                return report;
            }
        };

        for key in keys {
            if is_in_flight_key(&key) {
                report.skipped += 1;
                continue;
            }
            match self.begin(&key) {
                Step::Gone => {}
                Step::Skipped => report.skipped += 1,
                Step::Evicted => report.evicted += 1,
                Step::Aborted(event) => {
                    report.aborted += 1;
                    self.notifier.notify(event);
                }
                Step::Ready(request) => {
                    report.attempted += 1;
                    let outcome = self.send(&request);
                    let (event, settled) = self.finish(&key, request, outcome);
                    match (&event, settled) {
                        (RetryEvent::Succeeded { .. }, true) => report.succeeded += 1,
                        (_, true) => report.requeued += 1,
                        (_, false) => report.stranded += 1,
                    }
                    self.notifier.notify(event);
                }
            }
        }

        if report.attempted + report.aborted + report.evicted > 0 {
            info!(?report, "drain finished");
        } else {
            debug!(?report, "drain finished");
        }
        report
    }

    /// Checks a pending key and, if it may run, moves it in flight.
    fn begin(&self, key: &str) -> Step {
        let now = self.clock.now_ms();
        let queue = self.lock();

        let mut request = match queue.try_first(key) {
            Ok(Some(request)) => request,
            Ok(None) if queue.has(key) => {
                warn!(key, "dropping unreadable queue entry");
                return if queue.delete(key) { Step::Evicted } else { Step::Skipped };
            }
            Ok(None) => return Step::Gone,
            Err(e) => {
                warn!(key, error = %e, "cannot read queue entry");
                return Step::Skipped;
            }
        };

        if is_dirty(&request, key, now) {
            debug!(key, attempts = request.attempt_count(), "aborting queued request");
            if !queue.delete(key) {
                return Step::Skipped;
            }
            return Step::Aborted(abort_event(&request));
        }

        request.record_attempt();
        let flight = in_flight_key(key);
        if !queue.rename(key, &flight) {
            return Step::Skipped;
        }
        if !queue.put(&flight, &request) {
            // Restore the pending copy with its previous attempt count.
            queue.rename(&flight, key);
            return Step::Skipped;
        }
        debug!(key, attempt = request.attempt_count(), "request in flight");
        Step::Ready(request)
    }

    fn send(&self, request: &RetryableRequest) -> Result<HttpResponse, TransportError> {
        let target = request.to_executable();
        catch_unwind(AssertUnwindSafe(|| self.transport.execute(&target)))
            .unwrap_or_else(|_| Err(TransportError::Protocol("transport panicked".into())))
    }

    /// Resolves an in-flight key after execution. The flag is false when the
    /// entry could not be moved out of flight.
    fn finish(
        &self,
        key: &str,
        request: RetryableRequest,
        outcome: Result<HttpResponse, TransportError>,
    ) -> (RetryEvent, bool) {
        let flight = in_flight_key(key);
        let target = request.to_executable();
        let queue = self.lock();
        let (event, settled) = match outcome {
            Ok(response) if self.policy.is_success(&target, &response) => {
                debug!(key, status = response.status, "request delivered");
                let settled = queue.delete(&flight);
                (RetryEvent::Succeeded { request: target, response }, settled)
            }
            Ok(response) => {
                debug!(key, status = response.status, "request rejected, requeueing");
                let settled = queue.rename(&flight, key);
                (RetryEvent::Rejected { request: target, response }, settled)
            }
            Err(error) => {
                debug!(key, %error, "request failed, requeueing");
                let settled = queue.rename(&flight, key);
                (RetryEvent::Errored { request: target, error }, settled)
            }
        };
        if !settled {
            warn!(key, outcome = event.kind(), "request left in flight until next startup");
        }
        (event, settled)
    }

    /// Moves every in-flight key back to pending, attempt counts untouched.
    ///
    /// Meant for startup, before any drain: whatever was in flight then was
    /// interrupted by the previous process exiting.
    pub fn recover_in_flight(&self) -> usize {
        let queue = self.lock();
        let keys = match queue.try_keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "cannot list queue, skipping recovery");
                return 0;
            }
        };
        let mut recovered = 0;
        for key in keys.iter().filter(|k| is_in_flight_key(k)) {
            if queue.rename(key, pending_key(key)) {
                recovered += 1;
            }
        }
        if recovered > 0 {
            info!(recovered, "recovered interrupted requests");
        }
        recovered
    }

    /// Deletes dead, mismatched and unreadable entries in both namespaces.
    ///
    /// Dead and mismatched entries are reported as aborted; unreadable ones
    /// have nothing to report and are dropped silently.
    pub fn evict_dead(&self) -> usize {
        let now = self.clock.now_ms();
        let mut events = Vec::new();
        let mut evicted = 0;
        {
            let queue = self.lock();
            let keys = match queue.try_keys() {
                Ok(keys) => keys,
                Err(e) => {
                    warn!(error = %e, "cannot list queue, skipping eviction");
                    return 0;
                }
            };
            for key in keys {
                match queue.try_first(&key) {
                    Ok(Some(request)) => {
                        if is_dirty(&request, &key, now) && queue.delete(&key) {
                            evicted += 1;
                            events.push(abort_event(&request));
                        }
                    }
                    Ok(None) => {
                        if queue.delete(&key) {
                            evicted += 1;
                        }
                    }
                    Err(e) => warn!(%key, error = %e, "cannot read queue entry"),
                }
            }
        }
        if evicted > 0 {
            info!(evicted, "evicted dead queue entries");
        }
        for event in events {
            self.notifier.notify(event);
        }
        evicted
    }

    /// Every stored key with its decoded request.
    pub fn entries(&self) -> Vec<QueueEntry> {
        let queue = self.lock();
        queue
            .keys()
            .into_iter()
            .map(|key| {
                let state =
                    if is_in_flight_key(&key) { EntryState::InFlight } else { EntryState::Pending };
                QueueEntry {
                    fingerprint: pending_key(&key).to_string(),
                    request: queue.first(&key),
                    state,
                    key,
                }
            })
            .collect()
    }

    /// Number of stored keys in both namespaces.
    pub fn len(&self) -> usize {
        self.lock().keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes a fingerprint from both namespaces. Returns whether anything
    /// was stored under it.
    pub fn remove(&self, fingerprint: &str) -> bool {
        let fingerprint = pending_key(fingerprint);
        let flight = in_flight_key(fingerprint);
        let queue = self.lock();
        let existed = queue.has(fingerprint) || queue.has(&flight);
        let deleted = queue.delete(fingerprint) & queue.delete(&flight);
        existed && deleted
    }

    pub fn clear(&self) -> bool {
        self.lock().clear()
    }
}

/// Dead, or stored under a key that is not its own fingerprint.
fn is_dirty(request: &RetryableRequest, key: &str, now_ms: u64) -> bool {
    request.is_dead(now_ms) || request.fingerprint() != pending_key(key)
}

fn abort_event(request: &RetryableRequest) -> RetryEvent {
    RetryEvent::Aborted {
        request: request.to_executable(),
        deadline_ms: request.deadline_ms(),
        attempts: request.attempts_used(),
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
