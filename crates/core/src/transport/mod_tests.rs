// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    ok = { 200, true },
    no_content = { 204, true },
    edge_of_range = { 299, true },
    redirect = { 302, false },
    not_found = { 404, false },
    server_error = { 500, false },
    informational = { 100, false },
)]
fn default_policy_success(status: u16, expected: bool) {
    let request = HttpRequest::new("GET", "http://localhost/x").unwrap();
    let response = HttpResponse::new(status);
    assert_eq!(DefaultPolicy.is_success(&request, &response), expected);
}

#[test]
fn default_policy_retries_everything() {
    let request = HttpRequest::new("DELETE", "http://localhost/x").unwrap();
    assert!(DefaultPolicy.is_retryable(&request));
}

#[test]
fn io_error_converts() {
    let err: TransportError =
        std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed").into();
    assert_eq!(err, TransportError::Io("pipe closed".into()));
    assert_eq!(err.to_string(), "io error: pipe closed");
}

#[test]
fn arc_transport_delegates() {
    struct Fixed;
    impl Transport for Fixed {
        fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse::new(201).with_body("made"))
        }
    }

    let transport: Arc<dyn Transport> = Arc::new(Fixed);
    let request = HttpRequest::new("PUT", "http://localhost/x").unwrap();
    let response = transport.execute(&request).unwrap();
    assert_eq!(response.status, 201);
    assert_eq!(response.body, b"made");
}
