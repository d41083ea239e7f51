// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::net::TcpListener;

#[test]
fn flag_clones_share_state() {
    let flag = ConnectivityFlag::default();
    let handle = flag.clone();
    assert!(flag.is_online());

    handle.set_online(false);
    assert!(!flag.is_online());
}

#[test]
fn always_online() {
    assert!(AlwaysOnline.is_online());
    let shared: Arc<dyn Connectivity> = Arc::new(AlwaysOnline);
    assert!(shared.is_online());
}

#[test]
fn probe_reaches_listening_socket() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let probe = TcpProbe::new(listener.local_addr().unwrap().to_string(), Duration::from_secs(1));
    assert!(probe.is_online());
}

#[test]
fn probe_fails_on_closed_port() {
    let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let probe = TcpProbe::new(addr.to_string(), Duration::from_millis(500));
    assert!(!probe.is_online());
}

#[test]
fn probe_fails_on_unresolvable_target() {
    let probe = TcpProbe::new("not a host", Duration::from_millis(100));
    assert!(!probe.is_online());
}
