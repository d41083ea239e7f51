// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use rq_core::{EntryState, QueueEntry};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::config::QueueDir;
use crate::display::format_entry_line;
use crate::error::Result;

use super::open_session;

/// JSON representation of a queued request.
#[derive(Serialize)]
struct ListEntryJson {
    fingerprint: String,
    state: EntryState,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deadline_ms: Option<u64>,
    readable: bool,
}

impl From<QueueEntry> for ListEntryJson {
    fn from(entry: QueueEntry) -> Self {
        let request = entry.request.as_ref();
        ListEntryJson {
            readable: request.is_some(),
            method: request.map(|r| r.target().method.clone()),
            url: request.map(|r| r.target().url.clone()),
            attempts: request.map(|r| r.attempt_count()),
            max_attempts: request.and_then(|r| r.max_attempts()),
            deadline_ms: request.and_then(|r| r.deadline_ms()),
            state: entry.state,
            fingerprint: entry.fingerprint,
        }
    }
}

/// JSON output structure for the list command.
#[derive(Serialize)]
struct ListOutputJson {
    entries: Vec<ListEntryJson>,
}

pub fn run(dir: &QueueDir, output: OutputFormat) -> Result<()> {
    let session = open_session(dir, None)?;
    let entries = session.retrier.coordinator().entries();
    println!("{}", render(entries, output)?);
    Ok(())
}

pub(crate) fn render(entries: Vec<QueueEntry>, output: OutputFormat) -> Result<String> {
    match output {
        OutputFormat::Text if entries.is_empty() => Ok("queue is empty".to_string()),
        OutputFormat::Text => {
            Ok(entries.iter().map(format_entry_line).collect::<Vec<_>>().join("\n"))
        }
        OutputFormat::Json => {
            let json = ListOutputJson { entries: entries.into_iter().map(Into::into).collect() };
            Ok(serde_json::to_string_pretty(&json)?)
        }
    }
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
