// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::config::QueueDir;
use crate::display::short_fingerprint;
use crate::error::{Error, Result};

use super::{open_session, resolve_fingerprint};

pub fn run(dir: &QueueDir, prefix: &str) -> Result<()> {
    let session = open_session(dir, None)?;
    let coordinator = session.retrier.coordinator();
    let fingerprint = resolve_fingerprint(coordinator.entries(), prefix)?;
    if !coordinator.remove(&fingerprint) {
        return Err(Error::NotFound(prefix.to_string()));
    }
    println!("removed {}", short_fingerprint(&fingerprint));
    Ok(())
}
