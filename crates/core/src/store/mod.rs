// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Key-value byte storage.
//!
//! A [`ByteStore`] maps string keys to text content. It knows nothing about
//! what the content means; the typed layer lives in [`crate::queue`].
//!
//! Implementations:
//! - [`FileStore`]: one file per key in a directory, versioned, owned by a
//!   single process.
//! - [`MemoryStore`]: in-process map with the same semantics.

mod config_file;
mod file;
mod memory;

use std::path::Path;

pub use config_file::ConfigFile;
pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::{Error, Result};

/// Associative text storage keyed by string.
///
/// All operations are individually atomic with respect to a single key.
/// `rename` is an atomic move that replaces any existing destination.
pub trait ByteStore: Send + Sync {
    /// Replaces the content of `key`.
    fn put(&self, key: &str, content: &str) -> Result<()> {
        self.delete(key)?;
        self.append(key, content)
    }

    /// Appends `content` to `key`, creating it if absent.
    fn append(&self, key: &str, content: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key succeeds.
    fn delete(&self, key: &str) -> Result<()>;

    /// Moves `src` to `dst`, replacing `dst`. An absent `src` is a no-op.
    fn rename(&self, src: &str, dst: &str) -> Result<()>;

    /// Removes every key (backups and the version record are kept).
    fn clear(&self) -> Result<()>;

    fn has(&self, key: &str) -> bool;

    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Size of the content in bytes; zero when absent.
    fn size(&self, key: &str) -> Result<u64>;

    /// All keys currently present, sorted.
    fn keys(&self) -> Result<Vec<String>>;

    /// Schema version this store was opened with.
    fn version(&self) -> u32;

    /// Backing directory, if the store lives on disk.
    fn storage_dir(&self) -> Option<&Path>;

    /// Copies the content of `key` aside. Absent keys are ignored.
    fn backup(&self, key: &str) -> Result<()>;

    /// Drops the backup of `key`, if any.
    fn remove_backup(&self, key: &str) -> Result<()>;

    /// Restores `key` from its backup.
    fn recover(&self, key: &str) -> Result<()>;
}

/// Keys become file names, so they must be plain, non-empty names.
pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && !key.contains(['/', '\\', '\0', '\n']);
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
