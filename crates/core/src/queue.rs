// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed queue store over a [`ByteStore`].
//!
//! Each key holds one or more records, one per line, in the text form
//! produced by the codec. Malformed records are skipped on read. Storage
//! faults are logged and reported as `false`/`None`; they never propagate.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::warn;

use crate::codec::Codec;
use crate::error::Result;
use crate::store::ByteStore;

const RECORD_SEPARATOR: &str = "\n";

pub struct RetryQueue<T, C> {
    store: Arc<dyn ByteStore>,
    codec: C,
    _marker: PhantomData<fn() -> T>,
}

impl<T, C: Codec<T>> RetryQueue<T, C> {
    pub fn new(store: Arc<dyn ByteStore>, codec: C) -> Self {
        RetryQueue { store, codec, _marker: PhantomData }
    }

    pub fn store(&self) -> &Arc<dyn ByteStore> {
        &self.store
    }

    /// Replaces `key` with a single record.
    pub fn put(&self, key: &str, value: &T) -> bool {
        self.put_all(key, std::slice::from_ref(value))
    }

    /// Replaces `key` with `values`, one record each.
    pub fn put_all(&self, key: &str, values: &[T]) -> bool {
        if values.is_empty() {
            return self.delete(key);
        }
        let Some(text) = self.encode_all(values) else {
            return false;
        };
        report(key, "put", self.store.put(key, &text))
    }

    /// Adds a record after any existing ones.
    pub fn append(&self, key: &str, value: &T) -> bool {
        self.append_all(key, std::slice::from_ref(value))
    }

    pub fn append_all(&self, key: &str, values: &[T]) -> bool {
        if values.is_empty() {
            return true;
        }
        let Some(text) = self.encode_all(values) else {
            return false;
        };
        let existing = match self.store.size(key) {
            Ok(size) => size,
            Err(e) => return report(key, "append", Err(e)),
        };
        let text = if existing > 0 { format!("{RECORD_SEPARATOR}{text}") } else { text };
        report(key, "append", self.store.append(key, &text))
    }

    /// First decodable record under `key`.
    pub fn first(&self, key: &str) -> Option<T> {
        match self.try_first(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "queue read failed");
                None
            }
        }
    }

    /// Like [`first`](Self::first), but a storage fault is returned instead of
    /// being folded into `None`. `Ok(None)` means absent or nothing decodable.
    pub fn try_first(&self, key: &str) -> Result<Option<T>> {
        let Some(content) = self.store.get(key)? else {
            return Ok(None);
        };
        Ok(content.lines().filter(|l| !l.is_empty()).find_map(|line| self.decode(key, line)))
    }

    /// All decodable records under `key`, in order.
    pub fn get(&self, key: &str) -> Vec<T> {
        match self.store.get(key) {
            Ok(Some(content)) => content
                .lines()
                .filter(|l| !l.is_empty())
                .filter_map(|line| self.decode(key, line))
                .collect(),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key, error = %e, "queue read failed");
                Vec::new()
            }
        }
    }

    /// Number of decodable records under `key`.
    pub fn len(&self, key: &str) -> usize {
        self.get(key).len()
    }

    pub fn delete(&self, key: &str) -> bool {
        report(key, "delete", self.store.delete(key))
    }

    pub fn rename(&self, src: &str, dst: &str) -> bool {
        report(src, "rename", self.store.rename(src, dst))
    }

    pub fn keys(&self) -> Vec<String> {
        self.try_keys().unwrap_or_else(|e| {
            warn!(error = %e, "queue key listing failed");
            Vec::new()
        })
    }

    pub fn try_keys(&self) -> Result<Vec<String>> {
        self.store.keys()
    }

    pub fn has(&self, key: &str) -> bool {
        self.store.has(key)
    }

    pub fn size(&self, key: &str) -> u64 {
        self.store.size(key).unwrap_or(0)
    }

    pub fn clear(&self) -> bool {
        report("*", "clear", self.store.clear())
    }

    pub fn version(&self) -> u32 {
        self.store.version()
    }

    fn encode_all(&self, values: &[T]) -> Option<String> {
        let mut records = Vec::with_capacity(values.len());
        for value in values {
            match self.codec.encode(value) {
                Ok(text) => records.push(text),
                Err(e) => {
                    warn!(error = %e, "failed to encode queue record");
                    return None;
                }
            }
        }
        Some(records.join(RECORD_SEPARATOR))
    }

    fn decode(&self, key: &str, line: &str) -> Option<T> {
        match self.codec.decode(line) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "skipping malformed queue record");
                None
            }
        }
    }
}

fn report(key: &str, op: &str, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(key, op, error = %e, "queue write failed");
            false
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
