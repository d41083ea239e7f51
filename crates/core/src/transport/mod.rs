// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request execution port.
//!
//! The queue never talks to the network itself. A [`Transport`] executes a
//! request and either returns a response or fails before one arrives; a
//! [`RetryPolicy`] decides which responses count as delivered and which
//! requests are worth queueing at all.

#[cfg(feature = "http")]
pub mod http;

use std::sync::Arc;

use thiserror::Error;

use crate::request::{Headers, HttpRequest};

/// Response returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        HttpResponse { status, headers: Headers::new(), body: Vec::new() }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure before any response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("request could not be built: {0}")]
    InvalidRequest(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        TransportError::Io(e.to_string())
    }
}

/// Executes requests.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Application rules for what gets retried.
pub trait RetryPolicy: Send + Sync {
    /// Whether `response` means the request was delivered.
    fn is_success(&self, request: &HttpRequest, response: &HttpResponse) -> bool;

    /// Whether a failure of `request` should be queued for retry.
    fn is_retryable(&self, request: &HttpRequest) -> bool;
}

impl<P: RetryPolicy + ?Sized> RetryPolicy for Arc<P> {
    fn is_success(&self, request: &HttpRequest, response: &HttpResponse) -> bool {
        (**self).is_success(request, response)
    }

    fn is_retryable(&self, request: &HttpRequest) -> bool {
        (**self).is_retryable(request)
    }
}

/// 2xx is success; every request is retryable.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPolicy;

impl RetryPolicy for DefaultPolicy {
    fn is_success(&self, _request: &HttpRequest, response: &HttpResponse) -> bool {
        response.is_success()
    }

    fn is_retryable(&self, _request: &HttpRequest) -> bool {
        true
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
