// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent liveness (spec.md §4.3.1) and state-based stuck / nudge / escalate
//! (spec.md §4.3.2). One pass over every live worker session: capture its
//! pane, classify it, and apply the policy table.

use std::collections::BTreeMap;

use hive_adapters::{classify, AgentState};
use hive_core::{
    Clock, Effect, Escalation, EscalationId, EscalationStatus, EventType, HiveConfig, LogEntry,
    LogEntryId,
};
use hive_engine::{execute, EffectContext};
use hive_storage::Store;

use crate::checks::{reminder, CheckOutcome};
use crate::error::Result;
use crate::memory::TickMemory;

/// Lines of pane output captured per probe (spec.md §4.3.2: "the last N
/// lines of visible session output").
const CAPTURE_LINES: usize = 60;

pub async fn run(
    store: &Store,
    ctx: &EffectContext,
    config: &HiveConfig,
    clock: &impl Clock,
    memory: &mut TickMemory,
) -> Result<CheckOutcome> {
    let now = clock.epoch_ms();
    let state = store.read();

    let mut outcome = CheckOutcome::empty();
    let mut stale_count = 0usize;
    let mut nudged = 0usize;
    let mut escalated = 0usize;

    let live_sessions: Vec<_> =
        state.alive_agents().filter_map(|a| a.session_name.clone().map(|s| (a.clone(), s))).collect();

    for (agent, session_name) in live_sessions {
        if now.saturating_sub(agent.last_seen_ms) >= config.timing.stale_threshold_ms {
            stale_count += 1;
        }

        let pane = match execute(ctx, &Effect::CapturePane { session_name: session_name.clone(), lines: CAPTURE_LINES })
            .await
        {
            Ok(result) => result.captured_pane.unwrap_or_default(),
            Err(err) => {
                outcome.push_error(format!("capture_pane({session_name}) failed: {err}"));
                continue;
            }
        };

        let unchanged_ms = memory.track_pane(&session_name, &pane, now);
        let detector = classify(agent.cli_flavor, &pane);

        if detector.needs_human {
            if escalate_if_not_deduped(store, &state, &agent.id, &session_name, detector.state, now, config.timing.nudge_cooldown_ms)? {
                escalated += 1;
            }
            continue;
        }

        let nudge_text = match detector.state {
            AgentState::RateLimited => {
                let pause_s = parse_backoff_seconds(&pane).unwrap_or(config.timing.rate_limit_fallback_pause_ms / 1000);
                Some(format!("you appear to be rate-limited; run `sleep {pause_s} && <resume your work>` and press enter"))
            }
            AgentState::Interrupted => Some(format!(
                "your session was interrupted{}. Resume work and submit your pull request with `hive pr submit` when ready.",
                agent
                    .current_story_id
                    .as_ref()
                    .map(|s| format!(" on story {s}"))
                    .unwrap_or_default()
            )),
            AgentState::WorkComplete => {
                if memory.work_complete_notified(&session_name) {
                    None
                } else {
                    memory.mark_work_complete_notified(&session_name);
                    Some("looks like you're done — if your work is complete, submit your pull request with `hive pr submit`".to_string())
                }
            }
            AgentState::IdleAtPrompt | AgentState::Unknown
                if unchanged_ms >= config.timing.static_inactivity_threshold_ms =>
            {
                Some("you've been idle for a while. Run `hive my-stories` to see your assignment, or `hive escalate` if you're blocked.".to_string())
            }
            _ => None,
        };

        let Some(text) = nudge_text else { continue };
        if !memory.may_nudge(&session_name, now, config.timing.nudge_cooldown_ms) {
            continue;
        }

        match execute(
            ctx,
            &Effect::SendSessionMessageWithConfirmation { session_name: session_name.clone(), text: reminder(text) },
        )
        .await
        {
            Ok(_) => {
                memory.record_nudge(&session_name, now);
                nudged += 1;
            }
            Err(err) => outcome.push_error(format!("nudge({session_name}) failed: {err}")),
        }
    }

    if stale_count > 0 {
        outcome.push_line(format!("liveness: {stale_count} agent(s) past the stale threshold"));
    }
    if nudged > 0 {
        outcome.push_line(format!("stuck_nudge: nudged {nudged} session(s)"));
    }
    if escalated > 0 {
        outcome.push_line(format!("stuck_escalate: raised {escalated} escalation(s)"));
    }
    Ok(outcome)
}

fn escalate_if_not_deduped(
    store: &Store,
    state: &hive_storage::MaterializedState,
    agent_id: &hive_core::AgentId,
    session_name: &str,
    detector_state: AgentState,
    now: u64,
    cooldown_ms: u64,
) -> Result<bool> {
    let already_pending = state.pending_escalations().any(|e| {
        e.from_agent_id.as_ref() == Some(agent_id) && now.saturating_sub(e.created_at_ms) < cooldown_ms
    });
    if already_pending {
        return Ok(false);
    }

    let reason = guidance_for(detector_state, session_name);
    let escalation = Escalation {
        id: EscalationId::new(),
        story_id: None,
        from_agent_id: Some(agent_id.clone()),
        to_agent_id: None,
        reason: reason.clone(),
        status: EscalationStatus::Pending,
        resolution: None,
        created_at_ms: now,
        updated_at_ms: now,
    };

    store.with_transaction(|state| {
        state.upsert_escalation(escalation.clone());
        let mut metadata = BTreeMap::new();
        metadata.insert("session_name".to_string(), session_name.to_string());
        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: Some(agent_id.clone()),
            story_id: None,
            event_type: EventType::EscalationCreated,
            message: reason.clone(),
            metadata,
            created_at_ms: now,
        });
        Ok(())
    })?;
    Ok(true)
}

fn guidance_for(state: AgentState, session_name: &str) -> String {
    match state {
        AgentState::PermissionRequired => {
            format!("session {session_name} is waiting on a permission prompt — review and respond in the session")
        }
        AgentState::AwaitingSelection => {
            format!("session {session_name} is waiting on a menu selection — pick an option in the session")
        }
        AgentState::AskingQuestion => {
            format!("session {session_name} is asking a clarifying question — answer in the session")
        }
        AgentState::UserDeclined => {
            format!("session {session_name} had a suggested action declined — the agent needs direction")
        }
        _ => format!("session {session_name} needs human attention"),
    }
}

/// Best-effort extraction of a backoff duration (in seconds) from rate-limit
/// banner text, e.g. `"rate limited, retry in 45s"`. Falls back to the
/// configured default when no such pattern is found.
fn parse_backoff_seconds(output: &str) -> Option<u64> {
    for token in output.split(|c: char| !c.is_ascii_alphanumeric()) {
        if let Some(digits) = token.strip_suffix('s') {
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                return digits.parse().ok();
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_trailing_seconds_token() {
        assert_eq!(parse_backoff_seconds("rate limited, retry in 45s please wait"), Some(45));
    }

    #[test]
    fn falls_back_to_none_when_no_seconds_token_is_present() {
        assert_eq!(parse_backoff_seconds("rate limited, try again soon"), None);
    }
}
