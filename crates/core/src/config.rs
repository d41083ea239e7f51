// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retry tuning.

use std::time::Duration;

pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_LIFE: Duration = Duration::from_secs(7 * 24 * 60 * 60);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_INIT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_STORE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Shortest time between two triggered drains.
    pub min_interval: Duration,
    /// How long a queued request stays eligible; `None` keeps it forever.
    pub life: Option<Duration>,
    /// Attempts allowed per request; `None` is unbounded.
    pub max_attempts: Option<u32>,
    /// How long interception waits for startup recovery before passing
    /// requests straight through; `None` waits indefinitely.
    pub init_timeout: Option<Duration>,
    /// Schema version of the backing store. Bump when the record format or
    /// the fingerprint scheme changes.
    pub store_version: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            min_interval: DEFAULT_MIN_INTERVAL,
            life: Some(DEFAULT_LIFE),
            max_attempts: Some(DEFAULT_MAX_ATTEMPTS),
            init_timeout: Some(DEFAULT_INIT_TIMEOUT),
            store_version: DEFAULT_STORE_VERSION,
        }
    }
}
