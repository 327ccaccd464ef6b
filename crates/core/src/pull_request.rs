// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PullRequest: the merge-queue unit. The set of `queued`/`reviewing` PRs
//! per team forms the merge queue, FIFO.

use serde::{Deserialize, Serialize};

use crate::agent::AgentId;
use crate::story::StoryId;
use crate::team::TeamId;

crate::define_id! {
    /// Unique identifier for a pull request.
    pub struct PullRequestId("pr-");
}

/// Status lifecycle: `Queued → Reviewing → {Approved → Merged | Rejected}`,
/// with `Closed` as a manual terminal state reachable from any open status
/// (e.g. a duplicate submission auto-closes the prior PR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrStatus {
    Queued,
    Reviewing,
    Approved,
    Merged,
    Rejected,
    Closed,
}

crate::simple_display! {
    PrStatus {
        Queued => "queued",
        Reviewing => "reviewing",
        Approved => "approved",
        Merged => "merged",
        Rejected => "rejected",
        Closed => "closed",
    }
}

impl PrStatus {
    /// `queued`/`reviewing` are the merge-queue-open statuses.
    pub fn is_open(self) -> bool {
        matches!(self, PrStatus::Queued | PrStatus::Reviewing)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PrStatus::Merged | PrStatus::Rejected | PrStatus::Closed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: PullRequestId,
    pub story_id: StoryId,
    pub team_id: TeamId,
    pub branch_name: String,
    pub external_number: Option<u64>,
    pub external_url: Option<String>,
    pub status: PrStatus,
    pub submitter_agent_id: AgentId,
    pub reviewer_agent_id: Option<AgentId>,
    pub review_notes: Option<String>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

crate::builder! {
    pub struct PullRequestBuilder => PullRequest {
        into {
            branch_name: String = "story/example",
        }
        set {
            story_id: StoryId = StoryId::new(),
            team_id: TeamId = TeamId::new(),
            status: PrStatus = PrStatus::Queued,
            submitter_agent_id: AgentId = AgentId::new("senior-test"),
        }
        option {
            external_number: u64 = None,
            external_url: String = None,
            reviewer_agent_id: AgentId = None,
            review_notes: String = None,
        }
        computed {
            id: PullRequestId = PullRequestId::new(),
            created_at_ms: u64 = 0,
            updated_at_ms: u64 = 0,
        }
    }
}

#[cfg(test)]
#[path = "pull_request_tests.rs"]
mod tests;
