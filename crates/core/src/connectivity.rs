// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity checks gating drain passes.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

impl<C: Connectivity + ?Sized> Connectivity for Arc<C> {
    fn is_online(&self) -> bool {
        (**self).is_online()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysOnline;

impl Connectivity for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

/// Shared online/offline flag flipped by the host application.
///
/// Clones share state, so one clone can be handed to the retrier while the
/// application keeps another to report network changes.
#[derive(Debug, Clone)]
pub struct ConnectivityFlag(Arc<AtomicBool>);

impl ConnectivityFlag {
    pub fn new(online: bool) -> Self {
        ConnectivityFlag(Arc::new(AtomicBool::new(online)))
    }

    pub fn set_online(&self, online: bool) {
        self.0.store(online, Ordering::SeqCst);
    }
}

impl Default for ConnectivityFlag {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity for ConnectivityFlag {
    fn is_online(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Considers the network up when a TCP connection to `target` succeeds.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    target: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(target: impl Into<String>, timeout: Duration) -> Self {
        TcpProbe { target: target.into(), timeout }
    }

    fn addrs(&self) -> Vec<SocketAddr> {
        match self.target.to_socket_addrs() {
            Ok(addrs) => addrs.collect(),
            Err(e) => {
                debug!(target = %self.target, error = %e, "probe target did not resolve");
                Vec::new()
            }
        }
    }
}

impl Connectivity for TcpProbe {
    fn is_online(&self) -> bool {
        self.addrs()
            .iter()
            .any(|addr| TcpStream::connect_timeout(addr, self.timeout).is_ok())
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
