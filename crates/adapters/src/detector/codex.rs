// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Codex CLI pane classification.

use super::AgentState;

const PROMPT_GLYPH: &str = "▌";

pub(super) fn classify(output: &str) -> AgentState {
    let trimmed = output.trim_end();
    if trimmed.is_empty() {
        return AgentState::Unknown;
    }

    if trimmed.contains("rate limit") || trimmed.contains("429") {
        return AgentState::RateLimited;
    }
    if trimmed.contains("Allow command?") || trimmed.contains("approve this command") {
        return AgentState::PermissionRequired;
    }
    if trimmed.contains("1. Yes") && trimmed.contains("2. No") {
        return AgentState::AwaitingSelection;
    }
    if trimmed.contains("No, don't run it") {
        return AgentState::UserDeclined;
    }
    if trimmed.contains("Working") && trimmed.contains("(esc to interrupt)") {
        return AgentState::ToolRunning;
    }
    if trimmed.contains("Interrupted") {
        return AgentState::Interrupted;
    }
    let last_line = last_nonblank_line(trimmed);
    if last_line.starts_with(PROMPT_GLYPH) {
        if let Some(tail) = last_line.strip_prefix(PROMPT_GLYPH) {
            if tail.trim().is_empty() {
                return AgentState::IdleAtPrompt;
            }
            return AgentState::Typing;
        }
    }
    if trimmed.contains("tokens used") {
        return AgentState::WorkComplete;
    }

    AgentState::Unknown
}

fn last_nonblank_line(output: &str) -> &str {
    output.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_prompt_is_idle() {
        assert_eq!(classify("output\n▌"), AgentState::IdleAtPrompt);
    }

    #[test]
    fn typed_text_is_typing() {
        assert_eq!(classify("▌run the tests"), AgentState::Typing);
    }

    #[test]
    fn command_approval_is_permission_required() {
        assert_eq!(classify("Allow command?\n1. Yes\n2. No"), AgentState::PermissionRequired);
    }

    #[test]
    fn plain_menu_without_approval_wording_is_awaiting_selection() {
        assert_eq!(classify("Pick a plan\n1. Yes\n2. No"), AgentState::AwaitingSelection);
    }

    #[test]
    fn rate_limit_is_rate_limited() {
        assert_eq!(classify("received 429 rate limit"), AgentState::RateLimited);
    }

    #[test]
    fn tokens_used_banner_is_work_complete() {
        assert_eq!(classify("Done. 1234 tokens used"), AgentState::WorkComplete);
    }
}
