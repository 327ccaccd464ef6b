// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn only_queued_and_reviewing_are_open() {
    assert!(PrStatus::Queued.is_open());
    assert!(PrStatus::Reviewing.is_open());
    assert!(!PrStatus::Approved.is_open());
    assert!(!PrStatus::Merged.is_open());
}

#[test]
fn terminal_statuses() {
    assert!(PrStatus::Merged.is_terminal());
    assert!(PrStatus::Rejected.is_terminal());
    assert!(PrStatus::Closed.is_terminal());
    assert!(!PrStatus::Queued.is_terminal());
    assert!(!PrStatus::Approved.is_terminal());
}

#[test]
fn builder_defaults_to_queued() {
    let pr = PullRequest::builder().build();
    assert_eq!(pr.status, PrStatus::Queued);
    assert!(pr.reviewer_agent_id.is_none());
}
