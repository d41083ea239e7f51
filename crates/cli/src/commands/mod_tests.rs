// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use rq_core::EntryState;
use tempfile::TempDir;
use yare::parameterized;

fn args(method: &str, url: &str) -> RequestArgs {
    RequestArgs {
        method: method.to_string(),
        url: url.to_string(),
        headers: Vec::new(),
        data: None,
        content_type: None,
    }
}

fn entry(key: &str) -> QueueEntry {
    let fingerprint = key.trim_end_matches(rq_core::IN_FLIGHT_SUFFIX).to_string();
    let state = if key.ends_with(rq_core::IN_FLIGHT_SUFFIX) {
        EntryState::InFlight
    } else {
        EntryState::Pending
    };
    QueueEntry { key: key.to_string(), fingerprint, state, request: None }
}

#[parameterized(
    simple = { "Accept: text/plain", "Accept", "text/plain" },
    trimmed = { "  X-Id :  42 ", "X-Id", "42" },
    empty_value = { "X-Empty:", "X-Empty", "" },
    colon_in_value = { "Host: h:8080", "Host", "h:8080" },
)]
fn test_parse_header(raw: &str, name: &str, value: &str) {
    assert_eq!(parse_header(raw).unwrap(), (name.to_string(), value.to_string()));
}

#[parameterized(
    no_colon = { "Accept text/plain" },
    empty_name = { ": value" },
    space_in_name = { "Bad Name: v" },
)]
fn test_parse_header_rejects(raw: &str) {
    assert!(matches!(parse_header(raw), Err(Error::InvalidHeader(_))));
}

#[test]
fn test_build_request_with_headers_and_body() {
    let mut args = args("post", "http://h/x");
    args.headers = vec!["A: 1".into(), "a: 2".into()];
    args.data = Some("hello".into());
    args.content_type = Some("text/plain".into());

    let request = build_request(&args).unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(request.headers.get_all("A"), ["1", "2"]);
    let body = request.body.unwrap();
    assert_eq!(body.bytes, b"hello");
    assert_eq!(body.content_type.as_deref(), Some("text/plain"));
}

#[test]
fn test_build_request_rejects_bad_url() {
    assert!(matches!(build_request(&args("GET", "")), Err(Error::Queue(_))));
}

#[test]
fn test_resolve_fingerprint() {
    let entries = vec![entry("abc1"), entry("abc1.sending"), entry("abd2"), entry("ffff")];

    assert_eq!(resolve_fingerprint(entries.clone(), "abc").unwrap(), "abc1");
    assert_eq!(resolve_fingerprint(entries.clone(), "f").unwrap(), "ffff");
    assert!(matches!(
        resolve_fingerprint(entries.clone(), "ab"),
        Err(Error::AmbiguousFingerprint { matches, .. }) if matches == ["abc1", "abd2"]
    ));
    assert!(matches!(resolve_fingerprint(entries, "zz"), Err(Error::NotFound(_))));
}

#[test]
fn test_open_session_creates_layout() {
    let temp = TempDir::new().unwrap();
    let dir = QueueDir::new(temp.path());

    let session = open_session(&dir, None).unwrap();
    assert!(dir.store_path().is_dir());
    assert!(session.retrier.coordinator().is_empty());
    assert_eq!(session.retrier.init_state(), InitState::Ready);
}

#[test]
fn test_second_session_is_locked_out() {
    let temp = TempDir::new().unwrap();
    let dir = QueueDir::new(temp.path());

    let _first = open_session(&dir, None).unwrap();
    assert!(matches!(
        open_session(&dir, None),
        Err(Error::Queue(rq_core::Error::StoreLocked(_)))
    ));
}
