// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::RequestArgs;
use crate::config::QueueDir;
use crate::error::{Error, Result};

use super::{build_request, open_session};

/// Queues the request without sending it and prints its fingerprint.
pub fn run(dir: &QueueDir, args: RequestArgs) -> Result<()> {
    let request = build_request(&args)?;
    let session = open_session(dir, None)?;
    let fingerprint = session.retrier.enqueue(&request).ok_or(Error::NotQueued)?;
    println!("{fingerprint}");
    Ok(())
}
