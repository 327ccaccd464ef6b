// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Story: the atomic unit the pipeline moves through its fixed lifecycle.

use serde::{Deserialize, Serialize};

use crate::agent::AgentId;
use crate::requirement::RequirementId;
use crate::team::TeamId;

crate::define_id! {
    /// Unique identifier for a story.
    pub struct StoryId("story-");
}

/// Status lifecycle: `Draft → Estimated → Planned → InProgress → Review →
/// {PrSubmitted | QaFailed} → Qa → Merged`.
///
/// `QaFailed` is a documented open question (see `spec.md` §9): the order
/// table and the forward-transition check disagree on its position. This
/// implementation treats it as a lateral transition from `Review` (same
/// order position), per the spec's own "safer choice" note. Leaving
/// `QaFailed` for anywhere other than back into `InProgress` for rework
/// requires an explicit human override, recorded as a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryStatus {
    Draft,
    Estimated,
    Planned,
    InProgress,
    Review,
    QaFailed,
    PrSubmitted,
    Qa,
    Merged,
}

crate::simple_display! {
    StoryStatus {
        Draft => "draft",
        Estimated => "estimated",
        Planned => "planned",
        InProgress => "in_progress",
        Review => "review",
        QaFailed => "qa_failed",
        PrSubmitted => "pr_submitted",
        Qa => "qa",
        Merged => "merged",
    }
}

impl StoryStatus {
    pub fn order(self) -> u8 {
        match self {
            StoryStatus::Draft => 0,
            StoryStatus::Estimated => 1,
            StoryStatus::Planned => 2,
            StoryStatus::InProgress => 3,
            StoryStatus::Review | StoryStatus::QaFailed => 4,
            StoryStatus::PrSubmitted => 5,
            StoryStatus::Qa => 6,
            StoryStatus::Merged => 7,
        }
    }

    /// A story in any of these statuses must have a live `assigned_agent_id`
    /// (spec.md §3 invariant).
    pub fn requires_live_assignee(self) -> bool {
        matches!(
            self,
            StoryStatus::InProgress
                | StoryStatus::Review
                | StoryStatus::PrSubmitted
                | StoryStatus::Qa
                | StoryStatus::QaFailed
        )
    }

    /// Forward-only transition check per spec.md §3/§4.6/§9. `Qa → QaFailed`
    /// is the one explicitly-permitted backward edge; anywhere else backward
    /// requires an explicit human override and is not modeled as "forward".
    pub fn is_forward_transition(from: StoryStatus, to: StoryStatus) -> bool {
        if from == StoryStatus::Qa && to == StoryStatus::QaFailed {
            return true;
        }
        to.order() >= from.order()
    }
}

/// PM-external identity attached to a story (issue/subtask/project/provider).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PmExternalKeys {
    pub issue_key: Option<String>,
    pub subtask_key: Option<String>,
    pub project_key: Option<String>,
    pub provider: Option<String>,
}

/// The atomic unit the pipeline moves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub requirement_id: RequirementId,
    pub team_id: TeamId,
    pub title: String,
    pub description: String,
    pub acceptance_criteria: Vec<String>,
    /// Fibonacci complexity score, 1..13.
    pub complexity: u8,
    pub story_points: u32,
    /// Stories that must be `merged` before this one may enter `planned`.
    /// Stored sorted for deterministic serialization; duplicate inserts at
    /// the API boundary are no-ops.
    pub dependency_set: Vec<StoryId>,
    pub assigned_agent_id: Option<AgentId>,
    pub branch_name: Option<String>,
    pub status: StoryStatus,
    pub pm_keys: PmExternalKeys,
    pub in_sprint: bool,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Story {
    /// Insert a dependency, keeping the set sorted and deduplicated.
    pub fn add_dependency(&mut self, dep: StoryId) {
        if let Err(pos) = self.dependency_set.binary_search_by_key(&dep.as_str(), |d| d.as_str()) {
            self.dependency_set.insert(pos, dep);
        }
    }

    /// Eligible for `planned` when its dependency set is empty or every
    /// dependency has already reached `merged`.
    pub fn dependencies_satisfied(&self, merged: impl Fn(&StoryId) -> bool) -> bool {
        self.dependency_set.iter().all(merged)
    }
}

crate::builder! {
    pub struct StoryBuilder => Story {
        into {
            title: String = "User CRUD API",
            description: String = "Basic CRUD endpoints for user accounts",
        }
        set {
            requirement_id: RequirementId = RequirementId::new(),
            team_id: TeamId = TeamId::new(),
            complexity: u8 = 5,
            story_points: u32 = 3,
            dependency_set: Vec<StoryId> = Vec::new(),
            status: StoryStatus = StoryStatus::Draft,
            pm_keys: PmExternalKeys = PmExternalKeys::default(),
            in_sprint: bool = false,
            acceptance_criteria: Vec<String> = Vec::new(),
        }
        option {
            assigned_agent_id: AgentId = None,
            branch_name: String = None,
        }
        computed {
            id: StoryId = StoryId::new(),
            created_at_ms: u64 = 0,
            updated_at_ms: u64 = 0,
        }
    }
}

#[cfg(test)]
#[path = "story_tests.rs"]
mod tests;
