// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gemini CLI pane classification.

use super::AgentState;

const PROMPT_GLYPH: &str = "> ";

pub(super) fn classify(output: &str) -> AgentState {
    let trimmed = output.trim_end();
    if trimmed.is_empty() {
        return AgentState::Unknown;
    }

    if trimmed.contains("RESOURCE_EXHAUSTED") || trimmed.contains("quota exceeded") {
        return AgentState::RateLimited;
    }
    if trimmed.contains("Apply this change?") {
        return AgentState::PermissionRequired;
    }
    if trimmed.contains("● 1.") && trimmed.contains("● 2.") {
        return AgentState::AwaitingSelection;
    }
    if trimmed.contains("Modify") && trimmed.ends_with('?') {
        return AgentState::AskingQuestion;
    }
    if trimmed.contains("No (esc)") {
        return AgentState::UserDeclined;
    }
    if trimmed.contains("esc to cancel") {
        return AgentState::ToolRunning;
    }
    if trimmed.contains("cancelled by user") {
        return AgentState::Interrupted;
    }
    let last_line = last_nonblank_line(trimmed);
    if last_line.starts_with(PROMPT_GLYPH) {
        let tail = &last_line[PROMPT_GLYPH.len()..];
        if tail.trim().is_empty() {
            return AgentState::IdleAtPrompt;
        }
        return AgentState::Typing;
    }
    if trimmed.contains("Stats for nerds") {
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
        assert_eq!(classify("output\n> "), AgentState::IdleAtPrompt);
    }

    #[test]
    fn typed_text_is_typing() {
        assert_eq!(classify("> add a test"), AgentState::Typing);
    }

    #[test]
    fn apply_change_banner_is_permission_required() {
        assert_eq!(classify("Apply this change?"), AgentState::PermissionRequired);
    }

    #[test]
    fn selection_menu_is_awaiting_selection() {
        assert_eq!(classify("● 1. Yes\n● 2. No"), AgentState::AwaitingSelection);
    }

    #[test]
    fn quota_exceeded_is_rate_limited() {
        assert_eq!(classify("RESOURCE_EXHAUSTED: quota exceeded"), AgentState::RateLimited);
    }
}
