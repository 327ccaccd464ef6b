// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::prelude::*;

#[test]
fn bare_help_lists_top_level_commands() {
    cli().arg("--help").run().passes().stdout_has("status").stdout_has("init");
}

#[test]
fn version_flag_prints_a_version() {
    let ran = cli().arg("--version").run().passes();
    assert!(ran.stdout.trim_start().starts_with("hive "), "expected a \"hive <version>\" line, got: {}", ran.stdout);
}

#[test]
fn unknown_subcommand_fails_with_usage() {
    cli().arg("nonsense-command").run().fails();
}

#[test]
fn subcommand_help_mentions_its_own_flags() {
    cli().args(["status", "--help"]).run().passes().stdout_has("--format");
}
