// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use rq_core::{HttpRequest, HttpResponse, TransportError};

fn get(url: &str) -> HttpRequest {
    HttpRequest::new("GET", url).unwrap()
}

#[test]
fn test_render_skipped() {
    let text = render(None, &[], OutputFormat::Text).unwrap();
    assert!(text.starts_with("drain skipped"));
    assert!(text.contains("--force"));
}

#[test]
fn test_render_text_events_then_report() {
    let events = vec![
        RetryEvent::Succeeded { request: get("http://h/a"), response: HttpResponse::new(204) },
        RetryEvent::Errored {
            request: get("http://h/b"),
            error: TransportError::Timeout("60s".into()),
        },
    ];
    let report = DrainReport { attempted: 2, succeeded: 1, requeued: 1, ..DrainReport::default() };

    let text = render(Some(report), &events, OutputFormat::Text).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("succeeded"));
    assert!(lines[1].starts_with("errored"));
    assert_eq!(lines[2], "attempted 2, succeeded 1, requeued 1, aborted 0");
}

#[test]
fn test_event_json() {
    let aborted = RetryEvent::Aborted { request: get("http://h"), deadline_ms: Some(5), attempts: 3 };
    assert_eq!(
        EventJson::from(&aborted),
        EventJson {
            kind: "aborted",
            method: "GET".into(),
            url: "http://h".into(),
            status: None,
            error: None,
            attempts: Some(3),
        }
    );

    let rejected = RetryEvent::Rejected { request: get("http://h"), response: HttpResponse::new(500) };
    assert_eq!(EventJson::from(&rejected).status, Some(500));
}

#[test]
fn test_render_json_skipped() {
    let json = render(None, &[], OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["drained"], false);
    assert!(value.get("report").is_none());
    assert_eq!(value["events"].as_array().unwrap().len(), 0);
}
