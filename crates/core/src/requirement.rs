// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Requirement: a user-submitted unit of work, decomposed by the Tech Lead
//! into stories.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a requirement.
    pub struct RequirementId("req-");
}

/// Status lifecycle: `Pending → Planning → Planned → InProgress → SignOff →
/// {SignOffPassed, SignOffFailed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementStatus {
    Pending,
    Planning,
    Planned,
    InProgress,
    SignOff,
    SignOffPassed,
    SignOffFailed,
}

crate::simple_display! {
    RequirementStatus {
        Pending => "pending",
        Planning => "planning",
        Planned => "planned",
        InProgress => "in_progress",
        SignOff => "sign_off",
        SignOffPassed => "sign_off_passed",
        SignOffFailed => "sign_off_failed",
    }
}

impl RequirementStatus {
    /// Position in the fixed lifecycle order. `SignOffPassed`/`SignOffFailed`
    /// share a terminal order position — neither is "ahead" of the other.
    pub fn order(self) -> u8 {
        match self {
            RequirementStatus::Pending => 0,
            RequirementStatus::Planning => 1,
            RequirementStatus::Planned => 2,
            RequirementStatus::InProgress => 3,
            RequirementStatus::SignOff => 4,
            RequirementStatus::SignOffPassed | RequirementStatus::SignOffFailed => 5,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RequirementStatus::SignOffPassed | RequirementStatus::SignOffFailed)
    }
}

/// A user-submitted unit of work. Decomposed into one or more [`crate::story::Story`]
/// rows by the Tech Lead's one-shot planning call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requirement {
    pub id: RequirementId,
    pub title: String,
    pub description: String,
    pub submitter: String,
    pub status: RequirementStatus,
    /// Epic key when imported from an external PM provider.
    pub external_epic_key: Option<String>,
    /// Integration branch all of this requirement's stories merge into.
    pub feature_branch: Option<String>,
    /// Default integration branch (e.g. `main`) when `feature_branch` is unset.
    pub target_branch: String,
    /// Forces a premium model for every agent spawned against this requirement.
    pub godmode: bool,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

crate::builder! {
    pub struct RequirementBuilder => Requirement {
        into {
            title: String = "User management",
            description: String = "CRUD for user accounts",
            submitter: String = "alice",
            target_branch: String = "main",
        }
        set {
            status: RequirementStatus = RequirementStatus::Pending,
            godmode: bool = false,
        }
        option {
            external_epic_key: String = None,
            feature_branch: String = None,
        }
        computed {
            id: RequirementId = RequirementId::new(),
            created_at_ms: u64 = 0,
            updated_at_ms: u64 = 0,
        }
    }
}

#[cfg(test)]
#[path = "requirement_tests.rs"]
mod tests;
