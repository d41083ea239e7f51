// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text rendering for queue entries, retry events and drain reports.

use chrono::{DateTime, Utc};
use rq_core::listener::RetryEvent;
use rq_core::{DrainReport, EntryState, QueueEntry};

/// Number of fingerprint characters shown in text output.
pub const SHORT_FINGERPRINT_LEN: usize = 12;

pub fn short_fingerprint(fingerprint: &str) -> &str {
    fingerprint.get(..SHORT_FINGERPRINT_LEN).unwrap_or(fingerprint)
}

/// Formats milliseconds since epoch as a UTC timestamp.
pub fn format_timestamp(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("{ms}ms"))
}

pub fn format_deadline(deadline_ms: Option<u64>) -> String {
    match deadline_ms {
        Some(ms) => format_timestamp(ms),
        None => "never".to_string(),
    }
}

pub fn format_attempts(count: u32, max: Option<u32>) -> String {
    match max {
        Some(max) => format!("{count}/{max}"),
        None => format!("{count}/-"),
    }
}

pub fn state_label(state: EntryState) -> &'static str {
    match state {
        EntryState::Pending => "pending",
        EntryState::InFlight => "sending",
    }
}

/// One line per queued entry:
/// `<fingerprint>  <state>  attempts <n/max>  expires <time>  <METHOD> <url>`
pub fn format_entry_line(entry: &QueueEntry) -> String {
    let head = format!("{}  {:<7}", short_fingerprint(&entry.fingerprint), state_label(entry.state));
    match &entry.request {
        Some(request) => format!(
            "{head}  attempts {}  expires {}  {} {}",
            format_attempts(request.attempt_count(), request.max_attempts()),
            format_deadline(request.deadline_ms()),
            request.target().method,
            request.target().url,
        ),
        None => format!("{head}  (unreadable)"),
    }
}

pub fn format_event_line(event: &RetryEvent) -> String {
    let request = event.request();
    let target = format!("{} {}", request.method, request.url);
    match event {
        RetryEvent::Succeeded { response, .. } => {
            format!("succeeded  {target} ({})", response.status)
        }
        RetryEvent::Rejected { response, .. } => {
            format!("rejected   {target} ({})", response.status)
        }
        RetryEvent::Errored { error, .. } => format!("errored    {target}: {error}"),
        RetryEvent::Aborted { attempts, deadline_ms, .. } => format!(
            "aborted    {target} after {attempts} attempt{} (expires {})",
            if *attempts == 1 { "" } else { "s" },
            format_deadline(*deadline_ms),
        ),
    }
}

pub fn format_report(report: &DrainReport) -> String {
    let mut line = format!(
        "attempted {}, succeeded {}, requeued {}, aborted {}",
        report.attempted, report.succeeded, report.requeued, report.aborted
    );
    if report.evicted > 0 {
        line.push_str(&format!(", evicted {}", report.evicted));
    }
    if report.skipped > 0 {
        line.push_str(&format!(", skipped {}", report.skipped));
    }
    if report.stranded > 0 {
        line.push_str(&format!(", stranded {}", report.stranded));
    }
    line
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
