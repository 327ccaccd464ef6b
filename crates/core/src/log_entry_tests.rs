// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn event_type_display_is_screaming_snake_case() {
    assert_eq!(EventType::PrMerged.to_string(), "PR_MERGED");
    assert_eq!(EventType::JiraBoardPollCompleted.to_string(), "JIRA_BOARD_POLL_COMPLETED");
}

#[test]
fn builder_defaults_have_no_agent_or_story() {
    let entry = LogEntry::builder().build();
    assert!(entry.agent_id.is_none());
    assert!(entry.story_id.is_none());
}
