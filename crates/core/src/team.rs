// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Team: a named repository. Created by `add-repo`, never mutated after
//! except for its per-role worker caps.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

crate::define_id! {
    /// Unique identifier for a team (repository).
    pub struct TeamId("team-");
}

/// A named repository. Owns zero or more agents and stories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub display_name: String,
    pub repo_url: String,
    /// Relative path under the hive directory's repositories root.
    pub repo_path: PathBuf,
    pub junior_max: u32,
    pub intermediate_max: u32,
    pub senior_max: u32,
    pub qa_max: u32,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Team {
    /// Per-role worker cap, keyed by the role this story's complexity routes to.
    pub fn max_for(&self, role: crate::agent::RoleType) -> Option<u32> {
        match role {
            crate::agent::RoleType::Junior => Some(self.junior_max),
            crate::agent::RoleType::Intermediate => Some(self.intermediate_max),
            crate::agent::RoleType::Senior => Some(self.senior_max),
            crate::agent::RoleType::Qa => Some(self.qa_max),
            crate::agent::RoleType::TechLead | crate::agent::RoleType::FeatureTest => None,
        }
    }
}

crate::builder! {
    pub struct TeamBuilder => Team {
        into {
            display_name: String = "Backend",
            repo_url: String = "https://example.com/org/backend.git",
        }
        set {
            repo_path: PathBuf = PathBuf::from("backend"),
            junior_max: u32 = 2,
            intermediate_max: u32 = 1,
            senior_max: u32 = 1,
            qa_max: u32 = 1,
        }
        computed {
            id: TeamId = TeamId::new(),
            created_at_ms: u64 = 0,
            updated_at_ms: u64 = 0,
        }
    }
}

#[cfg(test)]
#[path = "team_tests.rs"]
mod tests;
