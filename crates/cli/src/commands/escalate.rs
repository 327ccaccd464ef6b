// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive escalate -m "<reason>" [--story <id>] [--to <session>]` (spec.md
//! §6): the general-purpose escalation channel any agent session can reach
//! for, as opposed to the Manager Daemon's own automatic escalations (stuck
//! detection, rate limits) or `hive plan`'s ambiguity-specific one. Always
//! blocks the calling agent — an escalation an agent doesn't wait on isn't
//! one, it's a comment.

use std::collections::BTreeMap;

use hive_core::{AgentStatus, Escalation, EscalationId, EscalationStatus, EventType, LogEntry, LogEntryId};

use crate::context;
use crate::exit_error::ExitError;

pub fn run(reason: String, story_id: Option<String>, to_session: Option<String>, session: Option<String>) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let agent_id = context::agent_for_session(&ctx, &session)?;
    let now = ctx.now_ms();

    let story = {
        let state = ctx.store.read();
        story_id.as_ref().map(|id| state.get_story(id).cloned().ok_or_else(|| ExitError::user(format!("no story {id}")))).transpose()?
    };

    let to_agent_id = match &to_session {
        None => None,
        Some(name) => {
            let state = ctx.store.read();
            Some(
                state
                    .agents
                    .values()
                    .find(|a| a.session_name.as_deref() == Some(name.as_str()))
                    .map(|a| a.id.clone())
                    .ok_or_else(|| ExitError::user(format!("no agent with session {name}")))?,
            )
        }
    };

    let escalation = Escalation {
        id: EscalationId::new(),
        story_id: story.as_ref().map(|s| s.id.clone()),
        from_agent_id: Some(agent_id.clone()),
        to_agent_id: to_agent_id.clone(),
        reason: reason.clone(),
        status: EscalationStatus::Pending,
        resolution: None,
        created_at_ms: now,
        updated_at_ms: now,
    };

    ctx.store.with_transaction(|state| {
        state.upsert_escalation(escalation.clone());
        if let Some(agent) = state.get_agent(agent_id.as_str()) {
            let mut updated = agent.clone();
            updated.status = AgentStatus::Blocked;
            updated.updated_at_ms = now;
            state.upsert_agent(updated);
        }
        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: Some(agent_id.clone()),
            story_id: escalation.story_id.clone(),
            event_type: EventType::EscalationCreated,
            message: reason.clone(),
            metadata: BTreeMap::new(),
            created_at_ms: now,
        });
        Ok(())
    })?;

    println!("{} {}", crate::color::bad("Escalated:"), escalation.id);
    Ok(())
}
