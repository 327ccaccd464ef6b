// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Escalation: a pending issue surfaced to another agent or to a human.
//! `to_agent_id == None` means human-targeted.

use serde::{Deserialize, Serialize};

use crate::agent::AgentId;
use crate::story::StoryId;

crate::define_id! {
    /// Unique identifier for an escalation.
    pub struct EscalationId("esc-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationStatus {
    Pending,
    Resolved,
}

crate::simple_display! {
    EscalationStatus {
        Pending => "pending",
        Resolved => "resolved",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Escalation {
    pub id: EscalationId,
    pub story_id: Option<StoryId>,
    pub from_agent_id: Option<AgentId>,
    pub to_agent_id: Option<AgentId>,
    pub reason: String,
    pub status: EscalationStatus,
    pub resolution: Option<String>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Escalation {
    /// Human-targeted escalations have a null `to_agent_id`.
    pub fn is_human_targeted(&self) -> bool {
        self.to_agent_id.is_none()
    }
}

crate::builder! {
    pub struct EscalationBuilder => Escalation {
        into {
            reason: String = "needs clarification",
        }
        set {
            status: EscalationStatus = EscalationStatus::Pending,
        }
        option {
            story_id: StoryId = None,
            from_agent_id: AgentId = None,
            to_agent_id: AgentId = None,
            resolution: String = None,
        }
        computed {
            id: EscalationId = EscalationId::new(),
            created_at_ms: u64 = 0,
            updated_at_ms: u64 = 0,
        }
    }
}

#[cfg(test)]
#[path = "escalation_tests.rs"]
mod tests;
