// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for commands that print structured data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "rq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Send HTTP requests and retry the ones that fail, across restarts")]
pub struct Cli {
    /// Queue directory (default: $RQ_DIR, then the platform data directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// A request described on the command line.
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// HTTP method, e.g. GET or POST
    pub method: String,

    /// Target URL
    pub url: String,

    /// Header in 'Name: value' form (repeatable)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Request body
    #[arg(short = 'd', long = "data", value_name = "BODY")]
    pub data: Option<String>,

    /// Media type of the body
    #[arg(long, value_name = "TYPE", requires = "data")]
    pub content_type: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Send a request now; queue it for retry if it fails
    Send(RequestArgs),

    /// Queue a request without sending it
    Enqueue(RequestArgs),

    /// List queued requests
    List {
        #[arg(short, long, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Retry queued requests
    Drain {
        /// Ignore the minimum interval and the connectivity check
        #[arg(short, long)]
        force: bool,

        /// Only drain when HOST:PORT accepts a TCP connection
        #[arg(long, value_name = "HOST:PORT")]
        probe: Option<String>,

        #[arg(short, long, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Remove a queued request by fingerprint (a unique prefix is enough)
    #[command(arg_required_else_help = true)]
    Remove {
        fingerprint: String,
    },

    /// Remove every queued request
    Clear,

    /// Show the effective configuration
    Config {
        #[arg(short, long, value_enum, default_value_t)]
        output: OutputFormat,
    },
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
