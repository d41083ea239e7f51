// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! The variable name constants are generated by `build.rs` and live in the
//! [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns the value of `RQ_DIR` if set and non-empty.
pub fn queue_dir() -> Option<PathBuf> {
    std::env::var(vars::RQ_DIR).ok().filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Returns the value of `RQ_LOG` if set.
pub fn log_filter() -> Option<String> {
    std::env::var(vars::RQ_LOG).ok()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
