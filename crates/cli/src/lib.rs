// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `rq`: send HTTP requests and keep retrying the ones that fail.
//!
//! Each command opens the queue directory, lets the retrier recover any
//! request a previous run left in flight, does its work and exits. See
//! [`config`] for the directory layout.

pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod env;
pub mod error;
pub mod logging;

pub use cli::{Cli, Command, OutputFormat};
pub use error::{Error, Result};

use config::QueueDir;

/// Runs one parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let dir = QueueDir::resolve(cli.dir, env::queue_dir(), dirs::data_local_dir())?;
    match cli.command {
        Command::Send(args) => commands::send::run(&dir, args),
        Command::Enqueue(args) => commands::enqueue::run(&dir, args),
        Command::List { output } => commands::list::run(&dir, output),
        Command::Drain { force, probe, output } => {
            commands::drain::run(&dir, force, probe, output)
        }
        Command::Remove { fingerprint } => commands::remove::run(&dir, &fingerprint),
        Command::Clear => commands::clear::run(&dir),
        Command::Config { output } => commands::config::run(&dir, output),
    }
}
