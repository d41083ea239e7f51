// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request model for the retry queue.
//!
//! [`HttpRequest`] is the executable form handed to a transport.
//! [`RetryableRequest`] wraps one together with its retry bookkeeping and is
//! the value persisted in the queue.
//!
//! The fingerprint of a retryable request is a SHA-256 digest over the
//! method, URL, headers, deadline and (when present) body. It is used directly
//! as the storage key, so two failures of the same logical request land on the
//! same key. The attempt counter is not part of the digest.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// A single header name with all of its values, in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub name: String,
    pub values: Vec<String>,
}

/// Ordered header multimap.
///
/// Names are grouped case-insensitively; the spelling of the first occurrence
/// is kept. Entry order is insertion order of each distinct name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(Vec<HeaderEntry>);

impl Headers {
    pub fn new() -> Self {
        Headers(Vec::new())
    }

    /// Builds a multimap from `(name, value)` pairs in order.
    pub fn from_pairs<I, N, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let mut headers = Headers::new();
        for (name, value) in pairs {
            headers.append(name, value);
        }
        headers
    }

    /// Adds a value under `name`, after any values already present.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|e| e.name.eq_ignore_ascii_case(&name)) {
            Some(entry) => entry.values.push(value),
            None => self.0.push(HeaderEntry { name, values: vec![value] }),
        }
    }

    /// Returns all values for `name` (case-insensitive).
    pub fn get_all(&self, name: &str) -> &[String] {
        self.0
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| e.values.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the first value for `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// Iterates over distinct header entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &HeaderEntry> {
        self.0.iter()
    }

    /// Iterates over every `(name, value)` pair, grouped by name in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .flat_map(|e| e.values.iter().map(move |v| (e.name.as_str(), v.as_str())))
    }

    /// Number of `(name, value)` pairs.
    pub fn len(&self) -> usize {
        self.0.iter().map(|e| e.values.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Request payload with its media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(with = "hex_bytes")]
    pub bytes: Vec<u8>,
}

impl Body {
    pub fn new(content_type: Option<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Body { content_type, bytes: bytes.into() }
    }
}

/// An outbound HTTP request in executable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

impl HttpRequest {
    /// Creates a request without headers or body.
    ///
    /// The method is upper-cased. Both method and URL must be non-empty and
    /// free of whitespace.
    pub fn new(method: &str, url: &str) -> Result<Self> {
        let method = method.trim();
        if method.is_empty()
            || !method.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::InvalidRequest(format!("invalid method '{method}'")));
        }
        let url = url.trim();
        if url.is_empty() || url.chars().any(char::is_whitespace) {
            return Err(Error::InvalidRequest(format!("invalid url '{url}'")));
        }
        Ok(HttpRequest {
            method: method.to_ascii_uppercase(),
            url: url.to_string(),
            headers: Headers::new(),
            body: None,
        })
    }

    /// Adds a header value.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Attaches a body.
    pub fn with_body(mut self, content_type: Option<&str>, bytes: impl Into<Vec<u8>>) -> Self {
        self.body = Some(Body::new(content_type.map(str::to_string), bytes));
        self
    }
}

/// A failed request captured for later replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryableRequest {
    target: HttpRequest,
    /// Absolute expiry in milliseconds since Unix epoch; `None` never expires.
    #[serde(default)]
    deadline_ms: Option<u64>,
    /// `None` means unbounded.
    #[serde(default)]
    max_attempts: Option<u32>,
    #[serde(default)]
    attempt_count: u32,
}

impl RetryableRequest {
    /// Captures `target` for retry.
    ///
    /// `life` is measured from `now_ms`; `None` means the request never
    /// expires.
    pub fn new(
        target: HttpRequest,
        life: Option<Duration>,
        max_attempts: Option<u32>,
        now_ms: u64,
    ) -> Self {
        let deadline_ms = life.map(|l| now_ms.saturating_add(l.as_millis() as u64));
        RetryableRequest { target, deadline_ms, max_attempts, attempt_count: 0 }
    }

    pub fn target(&self) -> &HttpRequest {
        &self.target
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// Counts one more drain attempt. Only the coordinator calls this.
    pub(crate) fn record_attempt(&mut self) {
        self.attempt_count = self.attempt_count.saturating_add(1);
    }

    /// Stable content digest, 64 lowercase hex characters.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        feed(&mut hasher, b"method", self.target.method.as_bytes());
        feed(&mut hasher, b"url", self.target.url.as_bytes());
        for entry in self.target.headers.entries() {
            feed(&mut hasher, b"header", entry.name.as_bytes());
            for value in &entry.values {
                feed(&mut hasher, b"value", value.as_bytes());
            }
        }
        let deadline = self.deadline_ms.map(|d| d.to_string()).unwrap_or_else(|| "-1".into());
        feed(&mut hasher, b"deadline", deadline.as_bytes());
        if let Some(body) = &self.target.body {
            feed(&mut hasher, b"content-type", body.content_type.as_deref().unwrap_or("").as_bytes());
            feed(&mut hasher, b"body", &body.bytes);
        }
        hex::encode(hasher.finalize())
    }

    /// True once the deadline has passed.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.deadline_ms.is_some_and(|d| now_ms > d)
    }

    /// True when the request must never be attempted again.
    ///
    /// Dead iff the deadline has passed or the attempt count exceeds a bounded
    /// maximum.
    pub fn is_dead(&self, now_ms: u64) -> bool {
        self.is_expired(now_ms) || self.max_attempts.is_some_and(|m| self.attempt_count > m)
    }

    /// Attempts reported when the request is given up.
    ///
    /// A request that exceeded its bound was counted once more than it ran
    /// within it, so the last increment is not reported.
    pub fn attempts_used(&self) -> u32 {
        self.attempt_count.saturating_sub(1)
    }

    /// Rebuilds the executable request, headers in their original order.
    pub fn to_executable(&self) -> HttpRequest {
        let mut request = HttpRequest {
            method: self.target.method.clone(),
            url: self.target.url.clone(),
            headers: Headers::new(),
            body: self.target.body.clone(),
        };
        for (name, value) in self.target.headers.iter() {
            request.headers.append(name, value);
        }
        request
    }
}

/// Length-prefixed field so adjacent fields cannot run into each other.
fn feed(hasher: &mut Sha256, label: &[u8], bytes: &[u8]) {
    hasher.update(label);
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
