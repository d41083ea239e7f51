// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn put_append_get() {
    let store = MemoryStore::default();

    store.append("k", "a").unwrap();
    store.append("k", "\nb").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("a\nb"));
    assert_eq!(store.size("k").unwrap(), 3);

    store.put("k", "c").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("c"));
}

#[test]
fn rename_replaces_destination_and_ignores_missing_source() {
    let store = MemoryStore::default();
    store.put("a", "1").unwrap();
    store.put("b", "2").unwrap();

    store.rename("a", "b").unwrap();
    assert_eq!(store.keys().unwrap(), vec!["b"]);
    assert_eq!(store.get("b").unwrap().as_deref(), Some("1"));

    store.rename("a", "b").unwrap();
    assert_eq!(store.get("b").unwrap().as_deref(), Some("1"));
}

#[test]
fn clear_keeps_backups() {
    let store = MemoryStore::new(4);
    store.put("k", "v").unwrap();
    store.backup("k").unwrap();
    store.clear().unwrap();

    assert!(!store.has("k"));
    store.recover("k").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    assert_eq!(store.version(), 4);
    assert_eq!(store.storage_dir(), None);
}

#[test]
fn recover_without_backup_fails() {
    let store = MemoryStore::default();
    assert!(store.recover("k").is_err());
}

#[test]
fn rejects_invalid_keys() {
    let store = MemoryStore::default();
    assert!(matches!(store.put("", "x"), Err(Error::InvalidKey(_))));
}
