// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue directory layout and configuration.
//!
//! A queue directory holds:
//! - `config.toml`: retry tuning, see [`Config`]
//! - `state`: bookkeeping kept between runs (time of the last drain)
//! - `queue/`: the persisted requests
//!
//! The config and state files sit outside `queue/` because a store version
//! change wipes that directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rq_core::store::ConfigFile;
use rq_core::RetryConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

const CONFIG_FILE_NAME: &str = "config.toml";
const STATE_FILE_NAME: &str = "state";
const STORE_DIR_NAME: &str = "queue";
const APP_DIR_NAME: &str = "requeue";
const LAST_DRAIN_ITEM: &str = "last_drain";

/// Retry tuning stored in `config.toml`.
///
/// Negative values for `life_secs`, `max_attempts` and `init_timeout_secs`
/// mean "no limit".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Shortest time between two drains that were not forced.
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: u64,
    /// How long a queued request stays eligible for retry.
    #[serde(default = "default_life_secs")]
    pub life_secs: i64,
    /// Attempts allowed per queued request.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i64,
    /// How long a command waits for startup recovery.
    #[serde(default = "default_init_timeout_secs")]
    pub init_timeout_secs: i64,
    /// Record format version. Changing it discards everything queued.
    #[serde(default = "default_store_version")]
    pub store_version: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_min_interval_secs() -> u64 {
    rq_core::config::DEFAULT_MIN_INTERVAL.as_secs()
}

fn default_life_secs() -> i64 {
    rq_core::config::DEFAULT_LIFE.as_secs() as i64
}

fn default_max_attempts() -> i64 {
    i64::from(rq_core::config::DEFAULT_MAX_ATTEMPTS)
}

fn default_init_timeout_secs() -> i64 {
    rq_core::config::DEFAULT_INIT_TIMEOUT.as_secs() as i64
}

fn default_store_version() -> u32 {
    rq_core::config::DEFAULT_STORE_VERSION
}

fn default_connect_timeout_secs() -> u64 {
    15
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Config {
            min_interval_secs: default_min_interval_secs(),
            life_secs: default_life_secs(),
            max_attempts: default_max_attempts(),
            init_timeout_secs: default_init_timeout_secs(),
            store_version: default_store_version(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    /// Loads `config.toml` from `dir`, falling back to defaults when absent.
    pub fn load(dir: &QueueDir) -> Result<Self> {
        let path = dir.config_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(e.into()),
        };
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the config to `config.toml` in `dir`.
    pub fn save(&self, dir: &QueueDir) -> Result<()> {
        fs::create_dir_all(dir.root())?;
        fs::write(dir.config_path(), self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts > i64::from(u32::MAX) {
            return Err(Error::Config(format!(
                "max_attempts {} is too large",
                self.max_attempts
            )));
        }
        if self.store_version == 0 {
            return Err(Error::Config("store_version must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Converts to the tuning the retrier understands.
    pub fn retry_config(&self) -> Result<RetryConfig> {
        self.validate()?;
        Ok(RetryConfig {
            min_interval: Duration::from_secs(self.min_interval_secs),
            life: bounded_secs(self.life_secs),
            max_attempts: u32::try_from(self.max_attempts).ok(),
            init_timeout: bounded_secs(self.init_timeout_secs),
            store_version: self.store_version,
        })
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn bounded_secs(secs: i64) -> Option<Duration> {
    u64::try_from(secs).ok().map(Duration::from_secs)
}

/// Paths inside a queue directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueDir {
    root: PathBuf,
}

impl QueueDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        QueueDir { root: root.into() }
    }

    /// Picks the queue directory: `--dir` wins, then `RQ_DIR`, then the
    /// platform data directory.
    pub fn resolve(
        flag: Option<PathBuf>,
        env: Option<PathBuf>,
        data_dir: Option<PathBuf>,
    ) -> Result<Self> {
        flag.or(env)
            .or_else(|| data_dir.map(|d| d.join(APP_DIR_NAME)))
            .map(QueueDir::new)
            .ok_or(Error::NoQueueDir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.join(STATE_FILE_NAME)
    }

    pub fn store_path(&self) -> PathBuf {
        self.root.join(STORE_DIR_NAME)
    }
}

/// Bookkeeping carried from one invocation to the next.
pub struct DrainState {
    file: ConfigFile,
}

impl DrainState {
    pub fn open(dir: &QueueDir) -> Self {
        DrainState { file: ConfigFile::new(dir.state_path()) }
    }

    /// Time of the last drain in ms since epoch. An unreadable value is
    /// treated as "never".
    pub fn last_drain(&self) -> Result<Option<u64>> {
        let Some(raw) = self.file.get(LAST_DRAIN_ITEM)? else {
            return Ok(None);
        };
        match raw.trim().parse() {
            Ok(ms) => Ok(Some(ms)),
            Err(_) => {
                warn!(value = %raw, "ignoring unreadable last drain time");
                Ok(None)
            }
        }
    }

    pub fn record_drain(&self, at_ms: u64) -> Result<()> {
        self.file.put(LAST_DRAIN_ITEM, &at_ms.to_string())?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
