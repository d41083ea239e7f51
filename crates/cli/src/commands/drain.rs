// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rq_core::{Connectivity, DrainReport, RetryEvent, RetryListener, TcpProbe};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::config::QueueDir;
use crate::display::{format_event_line, format_report};
use crate::error::Result;

use super::open_session;

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// JSON representation of one retry outcome.
#[derive(Serialize, Debug, PartialEq, Eq)]
struct EventJson {
    kind: &'static str,
    method: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attempts: Option<u32>,
}

impl From<&RetryEvent> for EventJson {
    fn from(event: &RetryEvent) -> Self {
        let request = event.request();
        let mut json = EventJson {
            kind: event.kind(),
            method: request.method.clone(),
            url: request.url.clone(),
            status: None,
            error: None,
            attempts: None,
        };
        match event {
            RetryEvent::Succeeded { response, .. } | RetryEvent::Rejected { response, .. } => {
                json.status = Some(response.status);
            }
            RetryEvent::Errored { error, .. } => json.error = Some(error.to_string()),
            RetryEvent::Aborted { attempts, .. } => json.attempts = Some(*attempts),
        }
        json
    }
}

/// JSON output structure for the drain command.
#[derive(Serialize)]
struct DrainOutputJson {
    drained: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<DrainReport>,
    events: Vec<EventJson>,
}

pub fn run(
    dir: &QueueDir,
    force: bool,
    probe: Option<String>,
    output: OutputFormat,
) -> Result<()> {
    let connectivity =
        probe.map(|target| Arc::new(TcpProbe::new(target, PROBE_TIMEOUT)) as Arc<dyn Connectivity>);
    let session = open_session(dir, connectivity)?;
    let retrier = &session.retrier;

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let listener: Arc<dyn RetryListener> = Arc::new(move |event: &RetryEvent| {
        sink.lock().unwrap_or_else(|e| e.into_inner()).push(event.clone());
    });
    retrier.add_listener(Arc::clone(&listener));

    let report = if force { Some(retrier.drain_now()?) } else { retrier.trigger_blocking()? };
    retrier.remove_listener(&listener);
    session.save_drain_time()?;

    let events = std::mem::take(&mut *events.lock().unwrap_or_else(|e| e.into_inner()));
    println!("{}", render(report, &events, output)?);
    Ok(())
}

pub(crate) fn render(
    report: Option<DrainReport>,
    events: &[RetryEvent],
    output: OutputFormat,
) -> Result<String> {
    match output {
        OutputFormat::Text => {
            let Some(report) = report else {
                return Ok(
                    "drain skipped: too soon after the last drain, or offline\n  hint: use --force to drain anyway"
                        .to_string(),
                );
            };
            let mut lines: Vec<String> = events.iter().map(format_event_line).collect();
            lines.push(format_report(&report));
            Ok(lines.join("\n"))
        }
        OutputFormat::Json => {
            let json = DrainOutputJson {
                drained: report.is_some(),
                report,
                events: events.iter().map(EventJson::from).collect(),
            };
            Ok(serde_json::to_string_pretty(&json)?)
        }
    }
}

#[cfg(test)]
#[path = "drain_tests.rs"]
mod tests;
