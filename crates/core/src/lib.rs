// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! rq-core: durable retry queue for outbound HTTP requests
//!
//! Requests that fail are persisted under a content fingerprint and replayed
//! later by drain passes, with bounded attempts and bounded lifetime. The
//! queue survives restarts; requests interrupted mid-flight are recovered on
//! the next start.

pub mod clock;
pub mod codec;
pub mod config;
pub mod connectivity;
pub mod coordinator;
pub mod error;
pub mod listener;
pub mod queue;
pub mod request;
pub mod retrier;
pub mod store;
pub mod transport;

#[cfg(test)]
mod test_helpers;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use codec::{Codec, JsonCodec};
pub use config::RetryConfig;
pub use connectivity::{AlwaysOnline, Connectivity, ConnectivityFlag, TcpProbe};
pub use coordinator::{Coordinator, DrainReport, EntryState, QueueEntry, IN_FLIGHT_SUFFIX};
pub use error::{Error, Result};
pub use listener::{
    Dispatch, InlineDispatcher, Listeners, Notifier, RetryEvent, RetryListener, ThreadDispatcher,
};
pub use queue::RetryQueue;
pub use request::{Body, Headers, HttpRequest, RetryableRequest};
pub use retrier::{DrainTrigger, InitState, Readiness, Retrier, RetrierBuilder};
pub use store::{ByteStore, FileStore, MemoryStore};
pub use transport::{DefaultPolicy, HttpResponse, RetryPolicy, Transport, TransportError};
#[cfg(feature = "http")]
pub use transport::http::ReqwestTransport;
