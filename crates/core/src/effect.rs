// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects the Manager Daemon's phase-1 decision logic hands to phase-2 for
//! execution, entirely outside the store's write lock (spec.md §4.3, §5).
//!
//! Each check reads a consistent snapshot, decides pure functionally which
//! of these it needs, executes them against the Session Supervisor and the
//! PM/VCS connectors, then re-enters the store for phase 3 to commit the
//! resulting state transitions. This is the same "closed enum of things the
//! runtime must do" shape used for job-runtime side effects elsewhere in
//! this family of tools, generalized to session I/O, connector calls, and
//! escalation creation instead of agent/workspace/shell/timer actions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::agent::AgentId;
use crate::escalation::EscalationId;
use crate::pull_request::PullRequestId;
use crate::story::StoryId;
use crate::team::TeamId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Create a new terminal-multiplexer session for a freshly spawned agent.
    CreateSession { agent_id: AgentId, session_name: String, work_dir: PathBuf, argv: Vec<String> },

    /// Append a message to a session's input buffer without pressing enter.
    SendSessionMessage { session_name: String, text: String },

    /// Press enter in a staged session (paired with `SendSessionMessage`).
    SendSessionEnter { session_name: String },

    /// Send a message, press enter, and require the manager to confirm the
    /// output changed within a bounded wait.
    SendSessionMessageWithConfirmation { session_name: String, text: String },

    /// Capture the last `lines` lines of a session's visible output.
    CapturePane { session_name: String, lines: usize },

    /// Kill a session and mark its agent terminated in the same phase-3 write.
    KillSession { session_name: String, agent_id: AgentId },

    /// Ask the VCS connector to create an integration branch.
    VcsCreateBranch { team_id: TeamId, branch_name: String, base: String },

    /// Ask the VCS connector to squash-merge and delete a PR's branch.
    VcsMergePr { pr_id: PullRequestId, external_number: u64, squash: bool, delete_branch: bool },

    /// Ask the VCS connector to merge the feature branch into the default
    /// branch on a successful feature sign-off.
    VcsMergeBranch { team_id: TeamId, source_branch: String, target_branch: String },

    /// Ask the VCS connector for the team's currently open PRs.
    VcsListOpenPrs { team_id: TeamId },

    /// Push a story's current status to the PM provider.
    PmPushStory { story_id: StoryId },

    /// Pull a story's external status from the PM provider.
    PmPullStatus { story_id: StoryId },

    /// Create a missing PM subtask for an assigned story.
    PmCreateSubtask { story_id: StoryId },

    /// Post a structured comment/event to the PM provider.
    PmPostComment { story_id: Option<StoryId>, event: String, context: String },

    /// Create a pending escalation (human-targeted when `to_agent_id` is `None`).
    CreateEscalation {
        story_id: Option<StoryId>,
        from_agent_id: Option<AgentId>,
        to_agent_id: Option<AgentId>,
        reason: String,
    },

    /// Surface a tick-level notification (coloured summary line, desktop
    /// notification, or both, depending on configuration).
    Notify { title: String, message: String },
}

impl Effect {
    /// Effect name for tracing spans (e.g. `"create_session"`, `"vcs_merge_pr"`).
    pub fn name(&self) -> &'static str {
        match self {
            Effect::CreateSession { .. } => "create_session",
            Effect::SendSessionMessage { .. } => "send_session_message",
            Effect::SendSessionEnter { .. } => "send_session_enter",
            Effect::SendSessionMessageWithConfirmation { .. } => {
                "send_session_message_with_confirmation"
            }
            Effect::CapturePane { .. } => "capture_pane",
            Effect::KillSession { .. } => "kill_session",
            Effect::VcsCreateBranch { .. } => "vcs_create_branch",
            Effect::VcsMergePr { .. } => "vcs_merge_pr",
            Effect::VcsMergeBranch { .. } => "vcs_merge_branch",
            Effect::VcsListOpenPrs { .. } => "vcs_list_open_prs",
            Effect::PmPushStory { .. } => "pm_push_story",
            Effect::PmPullStatus { .. } => "pm_pull_status",
            Effect::PmCreateSubtask { .. } => "pm_create_subtask",
            Effect::PmPostComment { .. } => "pm_post_comment",
            Effect::CreateEscalation { .. } => "create_escalation",
            Effect::Notify { .. } => "notify",
        }
    }

    /// Key-value pairs for structured logging.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::CreateSession { agent_id, session_name, work_dir, .. } => vec![
                ("agent_id", agent_id.to_string()),
                ("session_name", session_name.clone()),
                ("work_dir", work_dir.display().to_string()),
            ],
            Effect::SendSessionMessage { session_name, .. }
            | Effect::SendSessionEnter { session_name }
            | Effect::SendSessionMessageWithConfirmation { session_name, .. }
            | Effect::CapturePane { session_name, .. } => {
                vec![("session_name", session_name.clone())]
            }
            Effect::KillSession { session_name, agent_id } => vec![
                ("session_name", session_name.clone()),
                ("agent_id", agent_id.to_string()),
            ],
            Effect::VcsCreateBranch { team_id, branch_name, .. } => vec![
                ("team_id", team_id.to_string()),
                ("branch_name", branch_name.clone()),
            ],
            Effect::VcsMergePr { pr_id, external_number, .. } => vec![
                ("pr_id", pr_id.to_string()),
                ("external_number", external_number.to_string()),
            ],
            Effect::VcsMergeBranch { team_id, source_branch, target_branch } => vec![
                ("team_id", team_id.to_string()),
                ("source_branch", source_branch.clone()),
                ("target_branch", target_branch.clone()),
            ],
            Effect::VcsListOpenPrs { team_id } => vec![("team_id", team_id.to_string())],
            Effect::PmPushStory { story_id }
            | Effect::PmPullStatus { story_id }
            | Effect::PmCreateSubtask { story_id } => vec![("story_id", story_id.to_string())],
            Effect::PmPostComment { story_id, event, .. } => {
                let mut fields = vec![("event", event.clone())];
                if let Some(id) = story_id {
                    fields.push(("story_id", id.to_string()));
                }
                fields
            }
            Effect::CreateEscalation { story_id, to_agent_id, reason, .. } => {
                let mut fields = vec![("reason", reason.clone())];
                if let Some(id) = story_id {
                    fields.push(("story_id", id.to_string()));
                }
                fields.push((
                    "to_agent_id",
                    to_agent_id.as_ref().map(|a| a.to_string()).unwrap_or_else(|| "human".into()),
                ));
                fields
            }
            Effect::Notify { title, .. } => vec![("title", title.clone())],
        }
    }

    /// Whether to log both "started" and "completed", vs. a single
    /// "executed" line, for frequent low-signal effects.
    pub fn verbose(&self) -> bool {
        !matches!(self, Effect::CapturePane { .. } | Effect::SendSessionEnter { .. })
    }
}

/// The resolution attached to a created escalation, threaded back into
/// phase 3 alongside its [`EscalationId`] once the escalation has actually
/// been persisted (the id does not exist until the write transaction runs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectOutcome {
    pub escalation_id: Option<EscalationId>,
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
