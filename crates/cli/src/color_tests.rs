// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial]
fn no_color_env_var_disables_colorization() {
    std::env::set_var("NO_COLOR", "1");
    assert!(!should_colorize());
    std::env::remove_var("NO_COLOR");
}

#[test]
#[serial]
fn color_env_var_forces_colorization() {
    std::env::remove_var("NO_COLOR");
    std::env::set_var("COLOR", "1");
    assert!(should_colorize());
    std::env::remove_var("COLOR");
}

#[test]
#[serial]
fn plain_text_is_returned_unchanged_when_colorization_is_off() {
    std::env::set_var("NO_COLOR", "1");
    assert_eq!(header("x"), "x");
    assert_eq!(bad("y"), "y");
    std::env::remove_var("NO_COLOR");
}
