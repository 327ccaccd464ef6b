// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::agent::{Agent, AgentId, CliFlavor, RoleType};
use crate::escalation::{Escalation, EscalationStatus};
use crate::log_entry::{EventType, LogEntry};
use crate::pull_request::{PrStatus, PullRequest};
use crate::requirement::{Requirement, RequirementStatus};
use crate::story::{Story, StoryStatus};
use crate::team::{Team, TeamId};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core state machine types.
pub mod strategies {
    use super::*;
    use proptest::prelude::*;

    pub fn arb_role_type() -> impl Strategy<Value = RoleType> {
        prop_oneof![
            Just(RoleType::TechLead),
            Just(RoleType::Senior),
            Just(RoleType::Intermediate),
            Just(RoleType::Junior),
            Just(RoleType::Qa),
            Just(RoleType::FeatureTest),
        ]
    }

    pub fn arb_complexity() -> impl Strategy<Value = u8> {
        0u8..=10
    }

    pub fn arb_story_status() -> impl Strategy<Value = StoryStatus> {
        prop_oneof![
            Just(StoryStatus::Draft),
            Just(StoryStatus::Estimated),
            Just(StoryStatus::Planned),
            Just(StoryStatus::InProgress),
            Just(StoryStatus::Review),
            Just(StoryStatus::QaFailed),
            Just(StoryStatus::PrSubmitted),
            Just(StoryStatus::Qa),
            Just(StoryStatus::Merged),
        ]
    }

    pub fn arb_requirement_status() -> impl Strategy<Value = RequirementStatus> {
        prop_oneof![
            Just(RequirementStatus::Pending),
            Just(RequirementStatus::Planning),
            Just(RequirementStatus::Planned),
            Just(RequirementStatus::InProgress),
            Just(RequirementStatus::SignOff),
            Just(RequirementStatus::SignOffPassed),
            Just(RequirementStatus::SignOffFailed),
        ]
    }

    pub fn arb_pr_status() -> impl Strategy<Value = PrStatus> {
        prop_oneof![
            Just(PrStatus::Queued),
            Just(PrStatus::Reviewing),
            Just(PrStatus::Approved),
            Just(PrStatus::Merged),
            Just(PrStatus::Rejected),
            Just(PrStatus::Closed),
        ]
    }
}

// ── Entity factory functions ────────────────────────────────────────────

pub fn test_team(display_name: &str) -> Team {
    Team::builder()
        .display_name(display_name)
        .repo_url(format!("https://example.test/{display_name}.git"))
        .build()
}

pub fn test_requirement(title: &str) -> Requirement {
    Requirement::builder().title(title).build()
}

pub fn test_story(requirement_id: crate::requirement::RequirementId, team_id: TeamId, title: &str) -> Story {
    Story::builder().requirement_id(requirement_id).team_id(team_id).title(title).build()
}

pub fn test_agent(role: RoleType, team_id: Option<TeamId>) -> Agent {
    let mut builder = Agent::builder().role(role).cli_flavor(CliFlavor::Claude);
    if let Some(team_id) = team_id {
        builder = builder.team_id(team_id);
    }
    let mut agent = builder.build();
    agent.id = AgentId::generate(role);
    agent
}

pub fn test_pull_request(story_id: crate::story::StoryId, team_id: TeamId) -> PullRequest {
    PullRequest::builder().story_id(story_id).team_id(team_id).build()
}

pub fn test_escalation(reason: &str) -> Escalation {
    Escalation::builder().reason(reason).status(EscalationStatus::Pending).build()
}

pub fn test_log_entry(event_type: EventType, message: &str) -> LogEntry {
    LogEntry::builder().event_type(event_type).message(message).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_has_a_repo_url() {
        let team = test_team("acme");
        assert!(team.repo_url.contains("acme"));
    }

    #[test]
    fn test_agent_id_matches_its_role_prefix() {
        let agent = test_agent(RoleType::Senior, None);
        assert!(agent.id.as_str().starts_with("senior-"));
    }
}
