// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-process byte store.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use super::{validate_key, ByteStore};
use crate::error::{Error, Result};

#[derive(Default)]
struct Inner {
    entries: BTreeMap<String, String>,
    backups: BTreeMap<String, String>,
}

/// Byte store held entirely in memory. Content is lost on drop.
pub struct MemoryStore {
    version: u32,
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new(version: u32) -> Self {
        MemoryStore { version, inner: Mutex::new(Inner::default()) }
    }

    fn inner(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ByteStore for MemoryStore {
    fn put(&self, key: &str, content: &str) -> Result<()> {
        validate_key(key)?;
        self.inner().entries.insert(key.to_string(), content.to_string());
        Ok(())
    }

    fn append(&self, key: &str, content: &str) -> Result<()> {
        validate_key(key)?;
        self.inner().entries.entry(key.to_string()).or_default().push_str(content);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.inner().entries.remove(key);
        Ok(())
    }

    fn rename(&self, src: &str, dst: &str) -> Result<()> {
        validate_key(src)?;
        validate_key(dst)?;
        let mut inner = self.inner();
        if let Some(content) = inner.entries.remove(src) {
            inner.entries.insert(dst.to_string(), content);
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.inner().entries.clear();
        Ok(())
    }

    fn has(&self, key: &str) -> bool {
        self.inner().entries.contains_key(key)
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(self.inner().entries.get(key).cloned())
    }

    fn size(&self, key: &str) -> Result<u64> {
        validate_key(key)?;
        Ok(self.inner().entries.get(key).map_or(0, |c| c.len() as u64))
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.inner().entries.keys().cloned().collect())
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn storage_dir(&self) -> Option<&Path> {
        None
    }

    fn backup(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let mut inner = self.inner();
        if let Some(content) = inner.entries.get(key).cloned() {
            inner.backups.insert(key.to_string(), content);
        }
        Ok(())
    }

    fn remove_backup(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.inner().backups.remove(key);
        Ok(())
    }

    fn recover(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let mut inner = self.inner();
        let content = inner
            .backups
            .get(key)
            .cloned()
            .ok_or_else(|| Error::CorruptedData(format!("no backup for '{key}'")))?;
        inner.entries.insert(key.to_string(), content);
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
