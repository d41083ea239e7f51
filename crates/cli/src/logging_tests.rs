// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    quiet = { None, false, "warn" },
    verbose = { None, true, "debug" },
    env_wins = { Some("rq_core=trace"), true, "rq_core=trace" },
    blank_env_ignored = { Some("  "), false, "warn" },
)]
fn test_filter_directive(env_value: Option<&str>, verbose: bool, expected: &str) {
    assert_eq!(filter_directive(env_value.map(str::to_string), verbose), expected);
}
