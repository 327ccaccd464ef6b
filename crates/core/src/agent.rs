// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent: a logical worker. Agents are not in-process objects — they are
//! subprocess-backed terminal sessions plus a state row; the in-process
//! `Agent` type exists to produce the role-specific first prompt and to
//! mediate the Tech Lead's one-shot planning call.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::path::PathBuf;

use crate::story::StoryId;
use crate::team::TeamId;

/// Role-prefixed agent identifier (`senior-…`, `junior-…`, `tech-lead-…`, …).
///
/// Unlike [`crate::define_id!`]-generated IDs, `AgentId`'s prefix varies with
/// the agent's role rather than being fixed per type, so it is hand-rolled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a role-prefixed id: `{role-prefix}-{12-char nanoid}`.
    pub fn generate(role: RoleType) -> Self {
        Self(format!("{}-{}", role.id_prefix(), nanoid::nanoid!(12)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for AgentId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for AgentId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for AgentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// `tech_lead | senior | intermediate | junior | qa | feature_test`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    TechLead,
    Senior,
    Intermediate,
    Junior,
    Qa,
    FeatureTest,
}

crate::simple_display! {
    RoleType {
        TechLead => "tech_lead",
        Senior => "senior",
        Intermediate => "intermediate",
        Junior => "junior",
        Qa => "qa",
        FeatureTest => "feature_test",
    }
}

impl RoleType {
    /// Prefix used both for `AgentId` generation and for the session-name
    /// component (`hive-<role>-<teamSlug>`).
    pub fn id_prefix(self) -> &'static str {
        match self {
            RoleType::TechLead => "tech-lead",
            RoleType::Senior => "senior",
            RoleType::Intermediate => "intermediate",
            RoleType::Junior => "junior",
            RoleType::Qa => "qa",
            RoleType::FeatureTest => "feature-test",
        }
    }

    /// Role routing table: complexity → target role.
    ///
    /// `1..=3 → junior`, `4..=5 → intermediate`, `>=6 → senior`.
    pub fn for_complexity(complexity: u8) -> RoleType {
        match complexity {
            0..=3 => RoleType::Junior,
            4..=5 => RoleType::Intermediate,
            _ => RoleType::Senior,
        }
    }

    /// Whether `self` is an acceptable fallback for `target` when `target`
    /// is at its team cap. Higher roles may absorb a story; lower roles may
    /// not.
    pub fn may_absorb(self, target: RoleType) -> bool {
        self.seniority_rank() >= target.seniority_rank()
    }

    fn seniority_rank(self) -> u8 {
        match self {
            RoleType::Junior => 0,
            RoleType::Intermediate => 1,
            RoleType::Senior => 2,
            RoleType::TechLead | RoleType::Qa | RoleType::FeatureTest => u8::MAX,
        }
    }
}

/// `claude | codex | gemini`. Closed per spec; a new flavour requires a new
/// variant and a matching detector module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CliFlavor {
    Claude,
    Codex,
    Gemini,
}

crate::simple_display! {
    CliFlavor {
        Claude => "claude",
        Codex => "codex",
        Gemini => "gemini",
    }
}

/// `idle | working | blocked | terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Idle,
    Working,
    Blocked,
    Terminated,
}

crate::simple_display! {
    AgentStatus {
        Idle => "idle",
        Working => "working",
        Blocked => "blocked",
        Terminated => "terminated",
    }
}

/// A logical worker: a subprocess-backed terminal session plus this state row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub role: RoleType,
    /// Nullable for `tech_lead`, which is process-wide, not team-scoped.
    pub team_id: Option<TeamId>,
    pub session_name: Option<String>,
    pub cli_flavor: CliFlavor,
    pub status: AgentStatus,
    pub current_story_id: Option<StoryId>,
    /// Relative path under the hive directory's `agents/` subdirectory to
    /// this agent's opaque conversational-memory snapshot.
    pub memory_path: Option<PathBuf>,
    pub last_seen_ms: u64,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Agent {
    pub fn is_alive(&self) -> bool {
        self.status != AgentStatus::Terminated
    }
}

crate::builder! {
    pub struct AgentBuilder => Agent {
        set {
            role: RoleType = RoleType::Junior,
            cli_flavor: CliFlavor = CliFlavor::Claude,
            status: AgentStatus = AgentStatus::Working,
            last_seen_ms: u64 = 0,
        }
        option {
            team_id: TeamId = None,
            session_name: String = None,
            current_story_id: StoryId = None,
            memory_path: PathBuf = None,
        }
        computed {
            id: AgentId = AgentId::new(format!("test-{}", nanoid::nanoid!(8))),
            created_at_ms: u64 = 0,
            updated_at_ms: u64 = 0,
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
