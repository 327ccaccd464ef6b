// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Claude Code pane classification. Matches on the glyphs and banners the
//! CLI renders into its TUI pane, read bottom-up since the relevant state is
//! always whatever happened most recently.

use super::AgentState;

const PROMPT_GLYPH: &str = "│ >";
const ESC_INTERRUPT: &str = "esc to interrupt";

pub(super) fn classify(output: &str) -> AgentState {
    let trimmed = output.trim_end();
    if trimmed.is_empty() {
        return AgentState::Unknown;
    }

    if trimmed.contains("Rate limit") || trimmed.contains("rate_limit_error") {
        return AgentState::RateLimited;
    }
    if trimmed.contains("No, and tell Claude what to do differently") {
        return AgentState::UserDeclined;
    }
    if trimmed.contains("Do you want to proceed?") || trimmed.contains("Do you want to make this edit") {
        return AgentState::PermissionRequired;
    }
    if contains_numbered_menu(trimmed) {
        return AgentState::AwaitingSelection;
    }
    if trimmed.ends_with('?') && last_nonblank_line(trimmed).starts_with('●') {
        return AgentState::AskingQuestion;
    }
    if trimmed.contains(ESC_INTERRUPT) {
        return AgentState::ToolRunning;
    }
    if trimmed.contains("Interrupted by user") || trimmed.contains("Interrupted·") {
        return AgentState::Interrupted;
    }
    if trimmed.contains("Error: Claude Code process") || trimmed.contains("API Error") {
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
    if trimmed.contains("Totals:") || trimmed.contains("cost: $") {
        return AgentState::WorkComplete;
    }

    AgentState::Unknown
}

fn last_nonblank_line(output: &str) -> &str {
    output.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("")
}

/// Claude renders `y/n`-style confirmations and plan selections as a block of
/// lines starting with a digit followed by `.` or `)`, e.g. `1. Yes`.
fn contains_numbered_menu(output: &str) -> bool {
    let mut numbered_lines = 0;
    for line in output.lines().rev().take(12) {
        let line = line.trim();
        if line.starts_with("1.") || line.starts_with("1)") {
            numbered_lines += 1;
        } else if line.starts_with("2.") || line.starts_with("2)") {
            numbered_lines += 1;
        }
    }
    numbered_lines >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_prompt_glyph_with_no_input_is_idle() {
        assert_eq!(classify("some output\n│ >"), AgentState::IdleAtPrompt);
    }

    #[test]
    fn prompt_glyph_with_typed_text_is_typing() {
        assert_eq!(classify("│ > implement the fix"), AgentState::Typing);
    }

    #[test]
    fn esc_to_interrupt_banner_is_tool_running() {
        assert_eq!(
            classify("Running…\n(esc to interrupt)"),
            AgentState::ToolRunning
        );
    }

    #[test]
    fn numbered_confirmation_menu_is_awaiting_selection() {
        let pane = "Do you want to continue?\n1. Yes\n2. No\n";
        assert_eq!(classify(pane), AgentState::AwaitingSelection);
    }

    #[test]
    fn permission_banner_is_permission_required() {
        assert_eq!(
            classify("Do you want to proceed?\n1. Yes\n2. No"),
            AgentState::PermissionRequired
        );
    }

    #[test]
    fn rate_limit_banner_is_rate_limited() {
        assert_eq!(classify("Rate limit exceeded, retrying"), AgentState::RateLimited);
    }

    #[test]
    fn declined_edit_is_user_declined() {
        assert_eq!(
            classify("No, and tell Claude what to do differently"),
            AgentState::UserDeclined
        );
    }

    #[test]
    fn totals_banner_is_work_complete() {
        assert_eq!(classify("Done.\nTotals: 12 files changed"), AgentState::WorkComplete);
    }
}
