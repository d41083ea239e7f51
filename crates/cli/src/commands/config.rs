// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::config::{Config, DrainState, QueueDir};
use crate::display::format_timestamp;
use crate::error::Result;

/// JSON output structure for the config command.
#[derive(Serialize)]
struct ConfigOutputJson<'a> {
    dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_drain_ms: Option<u64>,
    config: &'a Config,
}

/// Shows the effective configuration. Does not open the queue, so it works
/// while another process holds it.
pub fn run(dir: &QueueDir, output: OutputFormat) -> Result<()> {
    let config = Config::load(dir)?;
    let last_drain = DrainState::open(dir).last_drain()?;
    println!("{}", render(dir, &config, last_drain, output)?);
    Ok(())
}

pub(crate) fn render(
    dir: &QueueDir,
    config: &Config,
    last_drain: Option<u64>,
    output: OutputFormat,
) -> Result<String> {
    match output {
        OutputFormat::Text => {
            let last = last_drain.map(format_timestamp).unwrap_or_else(|| "never".to_string());
            Ok(format!(
                "# dir: {}\n# last drain: {last}\n{}",
                dir.root().display(),
                config.to_toml()?.trim_end()
            ))
        }
        OutputFormat::Json => {
            let json = ConfigOutputJson {
                dir: dir.root().display().to_string(),
                last_drain_ms: last_drain,
                config,
            };
            Ok(serde_json::to_string_pretty(&json)?)
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
