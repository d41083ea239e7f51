// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Small `name:value` record file.
//!
//! Used by [`super::FileStore`] to remember the schema version of a queue
//! directory. One item per line; the first `:` separates name from value.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};

const KEY_VALUE_DIVIDER: char = ':';

pub struct ConfigFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ConfigFile { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the value stored under `name`, if any.
    pub fn get(&self, name: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self
            .read_items()?
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v))
    }

    /// Sets `name` to `value`, replacing any previous value.
    pub fn put(&self, name: &str, value: &str) -> Result<()> {
        validate_item(name, value)?;
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut items = self.read_items()?;
        match items.iter_mut().find(|(n, _)| n == name) {
            Some(item) => item.1 = value.to_string(),
            None => items.push((name.to_string(), value.to_string())),
        }
        self.write_items(&items)
    }

    /// Removes `name`. Returns whether it was present.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut items = self.read_items()?;
        let before = items.len();
        items.retain(|(n, _)| n != name);
        if items.len() == before {
            return Ok(false);
        }
        self.write_items(&items)?;
        Ok(true)
    }

    fn read_items(&self) -> Result<Vec<(String, String)>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        // Lines without a divider or with an empty name are ignored.
        Ok(content
            .lines()
            .filter_map(|line| line.split_once(KEY_VALUE_DIVIDER))
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect())
    }

    fn write_items(&self, items: &[(String, String)]) -> Result<()> {
        let tmp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&tmp_path)?;
        for (name, value) in items {
            writeln!(file, "{name}{KEY_VALUE_DIVIDER}{value}")?;
        }
        file.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn validate_item(name: &str, value: &str) -> Result<()> {
    if name.is_empty()
        || name.contains(KEY_VALUE_DIVIDER)
        || name.contains('\n')
        || value.contains('\n')
    {
        return Err(Error::InvalidConfigItem(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_file_tests.rs"]
mod tests;
