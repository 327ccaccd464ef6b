// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LogEntry: append-only event record. Never fails the enclosing business
//! transaction — it shares the transaction's atomicity so an event and its
//! state change land together.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::agent::AgentId;
use crate::story::StoryId;

crate::define_id! {
    /// Unique identifier for a log entry.
    pub struct LogEntryId("log-");
}

/// Closed event-type enumeration (spec.md §6), verbatim — no entries added
/// or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    AgentSpawned,
    AgentTerminated,
    PlanningStarted,
    PlanningCompleted,
    StoryCreated,
    StoryAssigned,
    StoryStarted,
    StoryProgressUpdate,
    StoryReviewRequested,
    StoryCompleted,
    EscalationCreated,
    PrSubmitted,
    PrReviewStarted,
    PrApproved,
    PrMerged,
    PrRejected,
    PrClosed,
    FeatureTestSpawned,
    FeatureSignOffTriggered,
    FeatureSignOffPassed,
    FeatureSignOffFailed,
    JiraSyncStarted,
    JiraSyncCompleted,
    JiraSyncWarning,
    JiraEpicCreated,
    JiraEpicIngested,
    JiraStoryCreated,
    JiraAssignmentRepaired,
    JiraAssignmentRepairFailed,
    JiraBoardPollStarted,
    JiraBoardPollCompleted,
}

crate::simple_display! {
    EventType {
        AgentSpawned => "AGENT_SPAWNED",
        AgentTerminated => "AGENT_TERMINATED",
        PlanningStarted => "PLANNING_STARTED",
        PlanningCompleted => "PLANNING_COMPLETED",
        StoryCreated => "STORY_CREATED",
        StoryAssigned => "STORY_ASSIGNED",
        StoryStarted => "STORY_STARTED",
        StoryProgressUpdate => "STORY_PROGRESS_UPDATE",
        StoryReviewRequested => "STORY_REVIEW_REQUESTED",
        StoryCompleted => "STORY_COMPLETED",
        EscalationCreated => "ESCALATION_CREATED",
        PrSubmitted => "PR_SUBMITTED",
        PrReviewStarted => "PR_REVIEW_STARTED",
        PrApproved => "PR_APPROVED",
        PrMerged => "PR_MERGED",
        PrRejected => "PR_REJECTED",
        PrClosed => "PR_CLOSED",
        FeatureTestSpawned => "FEATURE_TEST_SPAWNED",
        FeatureSignOffTriggered => "FEATURE_SIGN_OFF_TRIGGERED",
        FeatureSignOffPassed => "FEATURE_SIGN_OFF_PASSED",
        FeatureSignOffFailed => "FEATURE_SIGN_OFF_FAILED",
        JiraSyncStarted => "JIRA_SYNC_STARTED",
        JiraSyncCompleted => "JIRA_SYNC_COMPLETED",
        JiraSyncWarning => "JIRA_SYNC_WARNING",
        JiraEpicCreated => "JIRA_EPIC_CREATED",
        JiraEpicIngested => "JIRA_EPIC_INGESTED",
        JiraStoryCreated => "JIRA_STORY_CREATED",
        JiraAssignmentRepaired => "JIRA_ASSIGNMENT_REPAIRED",
        JiraAssignmentRepairFailed => "JIRA_ASSIGNMENT_REPAIR_FAILED",
        JiraBoardPollStarted => "JIRA_BOARD_POLL_STARTED",
        JiraBoardPollCompleted => "JIRA_BOARD_POLL_COMPLETED",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: LogEntryId,
    pub agent_id: Option<AgentId>,
    pub story_id: Option<StoryId>,
    pub event_type: EventType,
    pub message: String,
    pub metadata: BTreeMap<String, String>,
    pub created_at_ms: u64,
}

crate::builder! {
    pub struct LogEntryBuilder => LogEntry {
        into {
            message: String = "",
        }
        set {
            event_type: EventType = EventType::StoryCreated,
            metadata: BTreeMap<String, String> = BTreeMap::new(),
        }
        option {
            agent_id: AgentId = None,
            story_id: StoryId = None,
        }
        computed {
            id: LogEntryId = LogEntryId::new(),
            created_at_ms: u64 = 0,
        }
    }
}

#[cfg(test)]
#[path = "log_entry_tests.rs"]
mod tests;
