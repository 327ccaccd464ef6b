// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The State Detector (spec.md §4.5): a pure function from captured pane
//! output to a closed [`AgentState`]. No I/O, no subprocesses — this module
//! exists so the classification logic can be unit tested against fixed
//! strings without a real tmux session.

mod claude;
mod codex;
mod gemini;

use hive_core::CliFlavor;

/// The closed set of states a session can be in, per spec.md §4.3.2. Each
/// per-flavour submodule maps that CLI's prompt glyphs, menu layouts, and
/// banners onto this shared vocabulary so the Manager Daemon's nudge/
/// escalate policy (§4.3.2a/b) never has to know which CLI produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    IdleAtPrompt,
    Typing,
    ToolRunning,
    AwaitingSelection,
    AskingQuestion,
    PermissionRequired,
    UserDeclined,
    WorkComplete,
    RateLimited,
    Interrupted,
    Unknown,
}

impl AgentState {
    /// True for states where the session is blocked on something other than
    /// the agent's own ongoing work — used by the daemon to decide whether a
    /// stuck session is even a candidate for nudging (spec.md §4.3.2).
    pub fn is_waiting(self) -> bool {
        matches!(
            self,
            AgentState::AwaitingSelection
                | AgentState::AskingQuestion
                | AgentState::PermissionRequired
                | AgentState::UserDeclined
                | AgentState::IdleAtPrompt
        )
    }

    /// True for states that always require a human escalation rather than an
    /// automated nudge (spec.md §4.3.2: `PERMISSION_REQUIRED |
    /// AWAITING_SELECTION | ASKING_QUESTION | USER_DECLINED`).
    pub fn needs_human(self) -> bool {
        matches!(
            self,
            AgentState::PermissionRequired
                | AgentState::AwaitingSelection
                | AgentState::AskingQuestion
                | AgentState::UserDeclined
        )
    }
}

/// The detector's full verdict for one captured pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorResult {
    pub state: AgentState,
    pub is_waiting: bool,
    pub needs_human: bool,
}

impl DetectorResult {
    fn from_state(state: AgentState) -> Self {
        Self { state, is_waiting: state.is_waiting(), needs_human: state.needs_human() }
    }
}

/// Classify a captured pane for the given CLI flavour. Pure: the same
/// `(flavour, output)` pair always yields the same result.
pub fn classify(flavor: CliFlavor, output: &str) -> DetectorResult {
    let state = match flavor {
        CliFlavor::Claude => claude::classify(output),
        CliFlavor::Codex => codex::classify(output),
        CliFlavor::Gemini => gemini::classify(output),
    };
    DetectorResult::from_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_required_needs_human_and_is_waiting() {
        let result = classify(CliFlavor::Claude, "Do you want to proceed? (y/n)");
        assert_eq!(result.state, AgentState::PermissionRequired);
        assert!(result.needs_human);
        assert!(result.is_waiting);
    }

    #[test]
    fn tool_running_does_not_need_human_and_is_not_waiting() {
        let result = classify(CliFlavor::Claude, "Running tool: Bash(cargo test)...");
        assert_eq!(result.state, AgentState::ToolRunning);
        assert!(!result.needs_human);
        assert!(!result.is_waiting);
    }

    #[test]
    fn unknown_output_classifies_as_unknown() {
        let result = classify(CliFlavor::Gemini, "");
        assert_eq!(result.state, AgentState::Unknown);
        assert!(!result.needs_human);
    }
}
