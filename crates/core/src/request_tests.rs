// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

const NOW: u64 = 1_700_000_000_000;
const HOUR: Duration = Duration::from_secs(3600);

fn get(url: &str) -> HttpRequest {
    HttpRequest::new("GET", url).unwrap()
}

fn post_json() -> HttpRequest {
    HttpRequest::new("post", "https://api.example.com/events")
        .unwrap()
        .with_header("Accept", "application/json")
        .with_header("X-Trace", "a")
        .with_header("X-Trace", "b")
        .with_body(Some("application/json"), br#"{"id":1}"#.to_vec())
}

#[test]
fn new_uppercases_method() {
    let req = HttpRequest::new("patch", "http://localhost/x").unwrap();
    assert_eq!(req.method, "PATCH");
}

#[parameterized(
    empty_method = { "", "http://localhost/" },
    spaced_method = { "GE T", "http://localhost/" },
    empty_url = { "GET", "" },
    spaced_url = { "GET", "http://local host/" },
)]
fn new_rejects_invalid_input(method: &str, url: &str) {
    assert!(matches!(HttpRequest::new(method, url), Err(Error::InvalidRequest(_))));
}

#[test]
fn headers_group_values_by_name_in_insertion_order() {
    let headers = Headers::from_pairs([
        ("Accept", "text/html"),
        ("X-Trace", "1"),
        ("accept", "application/json"),
        ("X-Trace", "2"),
    ]);

    assert_eq!(headers.len(), 4);
    assert_eq!(headers.get_all("ACCEPT"), ["text/html", "application/json"]);
    assert_eq!(headers.get("x-trace"), Some("1"));

    let pairs: Vec<_> = headers.iter().collect();
    assert_eq!(
        pairs,
        vec![
            ("Accept", "text/html"),
            ("Accept", "application/json"),
            ("X-Trace", "1"),
            ("X-Trace", "2"),
        ]
    );
}

#[test]
fn headers_missing_name() {
    let headers = Headers::new();
    assert!(headers.is_empty());
    assert!(headers.get_all("accept").is_empty());
    assert_eq!(headers.get("accept"), None);
}

#[test]
fn fingerprint_is_fixed_length_hex() {
    let req = RetryableRequest::new(post_json(), Some(HOUR), Some(3), NOW);
    let fp = req.fingerprint();
    assert_eq!(fp.len(), 64);
    assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn fingerprint_is_stable_for_identical_target_and_deadline() {
    let a = RetryableRequest::new(post_json(), Some(HOUR), Some(3), NOW);
    let b = RetryableRequest::new(post_json(), Some(HOUR), Some(3), NOW);
    assert_eq!(a.fingerprint(), b.fingerprint());
}

#[test]
fn fingerprint_ignores_attempt_count_and_max_attempts() {
    let a = RetryableRequest::new(post_json(), Some(HOUR), Some(3), NOW);
    let mut b = RetryableRequest::new(post_json(), Some(HOUR), None, NOW);
    b.record_attempt();
    b.record_attempt();
    assert_eq!(a.fingerprint(), b.fingerprint());
}

#[test]
fn fingerprint_differs_when_identity_changes() {
    let base = RetryableRequest::new(post_json(), Some(HOUR), None, NOW).fingerprint();

    let other_url =
        RetryableRequest::new(get("https://api.example.com/events"), Some(HOUR), None, NOW);
    let other_deadline = RetryableRequest::new(post_json(), Some(HOUR), None, NOW + 1);
    let never = RetryableRequest::new(post_json(), None, None, NOW);
    let other_body = RetryableRequest::new(
        post_json().with_body(Some("application/json"), br#"{"id":2}"#.to_vec()),
        Some(HOUR),
        None,
        NOW,
    );
    let other_type = RetryableRequest::new(
        post_json().with_body(Some("text/plain"), br#"{"id":1}"#.to_vec()),
        Some(HOUR),
        None,
        NOW,
    );
    let extra_header =
        RetryableRequest::new(post_json().with_header("X-Trace", "c"), Some(HOUR), None, NOW);

    for other in [other_url, other_deadline, never, other_body, other_type, extra_header] {
        assert_ne!(other.fingerprint(), base);
    }
}

#[test]
fn fingerprint_does_not_confuse_adjacent_fields() {
    let a = RetryableRequest::new(get("http://h/ab").with_header("c", "d"), None, None, NOW);
    let b = RetryableRequest::new(get("http://h/a").with_header("bc", "d"), None, None, NOW);
    assert_ne!(a.fingerprint(), b.fingerprint());
}

#[test]
fn fingerprint_survives_persistence() {
    let req = RetryableRequest::new(post_json(), Some(HOUR), Some(3), NOW);
    let json = serde_json::to_string(&req).unwrap();
    let back: RetryableRequest = serde_json::from_str(&json).unwrap();
    assert_eq!(back, req);
    assert_eq!(back.fingerprint(), req.fingerprint());
}

#[test]
fn body_is_persisted_as_hex() {
    let req = RetryableRequest::new(post_json(), None, None, NOW);
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains(&hex::encode(br#"{"id":1}"#)));
    assert!(!json.contains('\n'));
}

#[test]
fn deadline_is_relative_to_now() {
    let req = RetryableRequest::new(get("http://h/"), Some(HOUR), None, NOW);
    assert_eq!(req.deadline_ms(), Some(NOW + 3_600_000));

    let forever = RetryableRequest::new(get("http://h/"), None, None, NOW);
    assert_eq!(forever.deadline_ms(), None);
}

#[parameterized(
    fresh = { Some(HOUR), Some(2), 0, NOW, false },
    at_deadline = { Some(HOUR), None, 0, NOW + 3_600_000, false },
    past_deadline = { Some(HOUR), None, 0, NOW + 3_600_001, true },
    never_expires = { None, None, 0, u64::MAX, false },
    attempts_at_max = { None, Some(2), 2, NOW, false },
    attempts_over_max = { None, Some(2), 3, NOW, true },
    unbounded_attempts = { None, None, 1000, NOW, false },
    zero_max_first_attempt = { None, Some(0), 1, NOW, true },
)]
fn liveness(life: Option<Duration>, max: Option<u32>, attempts: u32, now: u64, dead: bool) {
    let mut req = RetryableRequest::new(get("http://h/"), life, max, NOW);
    for _ in 0..attempts {
        req.record_attempt();
    }
    assert_eq!(req.is_dead(now), dead);
}

#[test]
fn to_executable_reproduces_original() {
    let original = post_json();
    let req = RetryableRequest::new(original.clone(), Some(HOUR), Some(3), NOW);

    let json = serde_json::to_string(&req).unwrap();
    let stored: RetryableRequest = serde_json::from_str(&json).unwrap();
    let rebuilt = stored.to_executable();

    assert_eq!(rebuilt.method, "POST");
    assert_eq!(rebuilt.url, original.url);
    let rebuilt_headers: Vec<_> = rebuilt.headers.iter().collect();
    let original_headers: Vec<_> = original.headers.iter().collect();
    assert_eq!(rebuilt_headers, original_headers);
    let body = rebuilt.body.unwrap();
    assert_eq!(body.bytes, br#"{"id":1}"#);
    assert_eq!(body.content_type.as_deref(), Some("application/json"));
}

#[test]
fn to_executable_without_body() {
    let req = RetryableRequest::new(get("http://h/x").with_header("A", "1"), None, None, NOW);
    let rebuilt = req.to_executable();
    assert_eq!(rebuilt.body, None);
    assert_eq!(rebuilt.headers.get("a"), Some("1"));
}

#[test]
fn missing_bookkeeping_fields_default() {
    let json = r#"{"target":{"method":"GET","url":"http://h/"}}"#;
    let req: RetryableRequest = serde_json::from_str(json).unwrap();
    assert_eq!(req.attempt_count(), 0);
    assert_eq!(req.max_attempts(), None);
    assert_eq!(req.deadline_ms(), None);
    assert!(req.target().headers.is_empty());
}

#[parameterized(
    never_attempted = { 0, 0 },
    once = { 1, 0 },
    past_bound = { 2, 1 },
    many = { 6, 5 },
)]
fn attempts_used(attempts: u32, expected: u32) {
    let mut req = RetryableRequest::new(get("http://h/"), None, Some(1), NOW);
    for _ in 0..attempts {
        req.record_attempt();
    }
    assert_eq!(req.attempts_used(), expected);
}
