// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Directory-backed byte store.
//!
//! Layout inside the storage directory:
//!
//! ```text
//! .lock            exclusive flock held while the store is open
//! store.conf       version record (name:value lines)
//! entry_<key>      content of <key>
//! backup_<key>     backup copy of <key>
//! tmp_<key>        staging file for atomic replace
//! ```
//!
//! Opening a directory whose recorded version differs from the requested one
//! wipes it. Each key file and each backup file is guarded by its own lock,
//! created on first use and kept for the lifetime of the store.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use fs2::FileExt;
use tracing::{debug, info, warn};

use super::config_file::ConfigFile;
use super::{validate_key, ByteStore};
use crate::error::{Error, Result};

const LOCK_FILE_NAME: &str = ".lock";
const CONFIG_FILE_NAME: &str = "store.conf";
const CONFIG_ITEM_VERSION: &str = "version";
const ENTRY_PREFIX: &str = "entry_";
const BACKUP_PREFIX: &str = "backup_";
const TEMP_PREFIX: &str = "tmp_";

/// Lazily created per-key locks.
#[derive(Default)]
struct KeyLocks(Mutex<HashMap<String, Arc<Mutex<()>>>>);

impl KeyLocks {
    fn get(&self, key: &str) -> Arc<Mutex<()>> {
        let mut map = self.0.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(map.entry(key.to_string()).or_default())
    }
}

/// Byte store keeping one file per key in a directory.
pub struct FileStore {
    dir: PathBuf,
    version: u32,
    locks: KeyLocks,
    backup_locks: KeyLocks,
    /// Held for the lifetime of the store; dropping it releases the flock.
    _owner: File,
}

impl FileStore {
    /// Opens (creating if needed) the store at `dir`.
    ///
    /// Fails with [`Error::StoreLocked`] if another open store owns the
    /// directory. A missing or different version record wipes the directory.
    pub fn open(dir: impl AsRef<Path>, version: u32) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let owner = acquire_lock(&dir.join(LOCK_FILE_NAME))?;

        let config = ConfigFile::new(dir.join(CONFIG_FILE_NAME));
        let recorded = config
            .get(CONFIG_ITEM_VERSION)?
            .and_then(|v| v.trim().parse::<u32>().ok());
        if recorded != Some(version) {
            info!(
                dir = %dir.display(),
                ?recorded,
                version,
                "storage version changed, discarding queue directory contents"
            );
            wipe_dir(&dir)?;
            config.put(CONFIG_ITEM_VERSION, &version.to_string())?;
        } else {
            remove_stale_temp_files(&dir)?;
        }

        Ok(FileStore {
            dir,
            version,
            locks: KeyLocks::default(),
            backup_locks: KeyLocks::default(),
            _owner: owner,
        })
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{ENTRY_PREFIX}{key}")))
    }

    fn backup_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{BACKUP_PREFIX}{key}")))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{TEMP_PREFIX}{key}"))
    }

    /// Writes `content` to a staging file and moves it over `path`.
    fn replace_file(&self, key: &str, path: &Path, content: &[u8]) -> Result<()> {
        let tmp = self.temp_path(key);
        let mut file = File::create(&tmp)?;
        file.write_all(content)?;
        file.sync_all()?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl ByteStore for FileStore {
    fn put(&self, key: &str, content: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        let lock = self.locks.get(key);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        self.replace_file(key, &path, content.as_bytes())
    }

    fn append(&self, key: &str, content: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        let lock = self.locks.get(key);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        let lock = self.locks.get(key);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        remove_if_exists(&path)
    }

    fn rename(&self, src: &str, dst: &str) -> Result<()> {
        let src_path = self.entry_path(src)?;
        let dst_path = self.entry_path(dst)?;
        if src == dst {
            return Ok(());
        }

        // Always lock in key order so two opposite renames cannot deadlock.
        let (first, second) = if src < dst { (src, dst) } else { (dst, src) };
        let first_lock = self.locks.get(first);
        let second_lock = self.locks.get(second);
        let _first = first_lock.lock().unwrap_or_else(|e| e.into_inner());
        let _second = second_lock.lock().unwrap_or_else(|e| e.into_inner());

        match fs::rename(&src_path, &dst_path) {
            Ok(()) => {
                debug!(src, dst, "renamed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound && !src_path.exists() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<()> {
        for key in self.keys()? {
            self.delete(&key)?;
        }
        Ok(())
    }

    fn has(&self, key: &str) -> bool {
        let Ok(path) = self.entry_path(key) else {
            return false;
        };
        let lock = self.locks.get(key);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        path.is_file()
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key)?;
        let lock = self.locks.get(key);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        match fs::read(&path) {
            // Invalid UTF-8 is content damage, not a storage fault: hand it
            // on lossily so the record fails to decode and gets evicted.
            Ok(bytes) => Ok(Some(String::from_utf8(bytes).unwrap_or_else(|e| {
                warn!(key, "entry is not valid UTF-8");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn size(&self, key: &str) -> Result<u64> {
        let path = self.entry_path(key)?;
        let lock = self.locks.get(key);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if let Some(key) = name.to_str().and_then(|n| n.strip_prefix(ENTRY_PREFIX)) {
                if !key.is_empty() {
                    keys.push(key.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn storage_dir(&self) -> Option<&Path> {
        Some(&self.dir)
    }

    fn backup(&self, key: &str) -> Result<()> {
        let src = self.entry_path(key)?;
        let dst = self.backup_path(key)?;
        let backup_lock = self.backup_locks.get(key);
        let lock = self.locks.get(key);
        let _backup_guard = backup_lock.lock().unwrap_or_else(|e| e.into_inner());
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        match fs::copy(&src, &dst) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound && !src.exists() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn remove_backup(&self, key: &str) -> Result<()> {
        let path = self.backup_path(key)?;
        let backup_lock = self.backup_locks.get(key);
        let _backup_guard = backup_lock.lock().unwrap_or_else(|e| e.into_inner());
        remove_if_exists(&path)
    }

    fn recover(&self, key: &str) -> Result<()> {
        let src = self.backup_path(key)?;
        let dst = self.entry_path(key)?;
        let backup_lock = self.backup_locks.get(key);
        let lock = self.locks.get(key);
        let _backup_guard = backup_lock.lock().unwrap_or_else(|e| e.into_inner());
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let content = fs::read(&src)?;
        self.replace_file(key, &dst, &content)
    }
}

fn acquire_lock(lock_path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(lock_path)?;
    file.try_lock_exclusive()
        .map_err(|_| Error::StoreLocked(lock_path.display().to_string()))?;
    Ok(file)
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Removes everything in `dir` except the lock file.
fn wipe_dir(dir: &Path) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name() == LOCK_FILE_NAME {
            continue;
        }
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

fn remove_stale_temp_files(dir: &Path) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let is_temp = entry.file_name().to_str().is_some_and(|n| n.starts_with(TEMP_PREFIX));
        if is_temp {
            debug!(path = %entry.path().display(), "removing stale staging file");
            remove_if_exists(&entry.path())?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
