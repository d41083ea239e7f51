// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use rq_core::RetryPolicy;

use crate::cli::RequestArgs;
use crate::config::QueueDir;
use crate::error::{Error, Result};

use super::{build_request, open_session};

/// Sends the request. The response body goes to stdout; on failure the
/// request is queued and the command fails.
pub fn run(dir: &QueueDir, args: RequestArgs) -> Result<()> {
    let request = build_request(&args)?;
    let session = open_session(dir, None)?;
    let retrier = &session.retrier;

    match retrier.execute(&request) {
        Ok(response) if retrier.coordinator().policy().is_success(&request, &response) => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&response.body)?;
            stdout.flush()?;
            Ok(())
        }
        Ok(response) => Err(Error::RequestFailed(format!("server answered {}", response.status))),
        Err(e) => Err(Error::RequestFailed(e.to_string())),
    }
}
