// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use tracing_subscriber::EnvFilter;

use crate::env;

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "debug";

/// Picks the log filter: `RQ_LOG` wins, then `--verbose`, then warnings only.
pub fn filter_directive(env_value: Option<String>, verbose: bool) -> String {
    match env_value {
        Some(value) if !value.trim().is_empty() => value,
        _ if verbose => VERBOSE_FILTER.to_string(),
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Sends tracing output to stderr so stdout stays machine readable.
pub fn setup_logging(verbose: bool) {
    let directive = filter_directive(env::log_filter(), verbose);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
