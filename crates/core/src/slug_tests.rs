// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn basic_slugify() {
    assert_eq!(slugify("Hello World", 28), "hello-world");
}

#[test]
fn stop_words_removed() {
    assert_eq!(slugify("Fix the login button", 28), "fix-login-button");
}

#[test]
fn non_alphanum_replaced() {
    assert_eq!(slugify("fix: login_button!", 28), "fix-login-button");
}

#[test]
fn multiple_hyphens_collapsed() {
    assert_eq!(slugify("foo---bar", 28), "foo-bar");
}

#[test]
fn truncation_at_word_boundary() {
    let result = slugify("Implement User Authentication System", 28);
    assert!(result.len() <= 28);
    assert!(!result.ends_with('-'));
    assert_eq!(result, "implement-user");
}

#[test]
fn truncation_single_long_word() {
    let result = slugify("abcdefghijklmnopqrstuvwxyz12345", 28);
    assert_eq!(result, "abcdefghijklmnopqrstuvwxyz12");
}

#[test]
fn empty_after_stop_word_removal() {
    assert_eq!(slugify("the a an is are", 28), "");
}

#[test]
fn leading_trailing_hyphens_trimmed() {
    assert_eq!(slugify("--hello--", 28), "hello");
}

#[test]
fn consecutive_duplicates_only() {
    assert_eq!(slugify("test test test", 28), "test");
}

#[test]
fn team_slug_falls_back_when_empty() {
    assert_eq!(team_slug("the a an"), "team");
}

#[test]
fn team_slug_truncates_long_names() {
    let slug = team_slug("Backend Payments Infrastructure Monorepo");
    assert!(slug.len() <= 24);
    assert!(!slug.ends_with('-'));
}

#[test]
fn team_slug_basic() {
    assert_eq!(team_slug("Backend"), "backend");
}
