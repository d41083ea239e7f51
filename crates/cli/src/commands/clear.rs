// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::config::QueueDir;
use crate::error::{Error, Result};

use super::open_session;

pub fn run(dir: &QueueDir) -> Result<()> {
    let session = open_session(dir, None)?;
    let coordinator = session.retrier.coordinator();
    let count = coordinator.len();
    if !coordinator.clear() {
        return Err(Error::Config(format!(
            "could not clear {}",
            session.dir.store_path().display()
        )));
    }
    println!("removed {count} entr{}", if count == 1 { "y" } else { "ies" });
    Ok(())
}
