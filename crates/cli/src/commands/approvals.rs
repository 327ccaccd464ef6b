// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive approvals list|show|approve|deny` (spec.md §6): the human side of
//! escalations. `list` defaults to pending-only; `approve`/`deny` resolve
//! one and, if it blocked an agent, clears that block.

use std::collections::BTreeMap;

use hive_core::{AgentStatus, EscalationStatus, EventType, LogEntry, LogEntryId};
use serde::Serialize;

use crate::context;
use crate::exit_error::ExitError;
use crate::output::{self, OutputFormat};

#[derive(Serialize)]
struct EscalationRow {
    id: String,
    status: String,
    story_id: Option<String>,
    from: Option<String>,
    reason: String,
}

/// `hive approvals list [--all] [--json]`.
pub fn list(all: bool, format: OutputFormat) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let state = ctx.store.read();

    let mut rows: Vec<EscalationRow> = state
        .escalations
        .values()
        .filter(|e| all || e.status == EscalationStatus::Pending)
        .map(|e| EscalationRow {
            id: e.id.to_string(),
            status: e.status.to_string(),
            story_id: e.story_id.as_ref().map(|s| s.to_string()),
            from: e.from_agent_id.as_ref().map(|a| a.to_string()),
            reason: e.reason.clone(),
        })
        .collect();
    rows.sort_by(|a, b| a.id.cmp(&b.id));

    output::handle_list(format, &rows, "no pending escalations", |rows| {
        for row in rows {
            println!("{}  {}  {}", crate::color::context(&row.id), row.status, row.reason);
        }
    })
    .map_err(|e| ExitError::internal(e.to_string()))
}

/// `hive approvals show <id>`.
pub fn show(escalation_id: String, format: OutputFormat) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let state = ctx.store.read();
    let escalation = state.get_escalation(&escalation_id).cloned().ok_or_else(|| ExitError::user(format!("no escalation {escalation_id}")))?;

    output::format_or_json(format, &escalation, || {
        println!("{} {}", crate::color::header("Escalation"), escalation.id);
        println!("  status: {}", escalation.status);
        if let Some(story_id) = &escalation.story_id {
            println!("  story:  {story_id}");
        }
        if let Some(from) = &escalation.from_agent_id {
            println!("  from:   {from}");
        }
        println!("  reason: {}", escalation.reason);
        if let Some(resolution) = &escalation.resolution {
            println!("  resolution: {resolution}");
        }
    })
    .map_err(|e| ExitError::internal(e.to_string()))
}

fn resolve(escalation_id: String, resolution: String, unblock: bool) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let now = ctx.now_ms();
    let escalation = ctx.store.read().get_escalation(&escalation_id).cloned().ok_or_else(|| ExitError::user(format!("no escalation {escalation_id}")))?;

    if escalation.status != EscalationStatus::Pending {
        return Err(ExitError::user(format!("escalation {} is already {}", escalation.id, escalation.status)));
    }

    ctx.store.with_transaction(|state| {
        if let Some(fresh) = state.get_escalation(escalation.id.as_str()) {
            let mut updated = fresh.clone();
            updated.status = EscalationStatus::Resolved;
            updated.resolution = Some(resolution.clone());
            updated.updated_at_ms = now;
            state.upsert_escalation(updated);
        }
        if unblock {
            if let Some(from_id) = &escalation.from_agent_id {
                if let Some(agent) = state.get_agent(from_id.as_str()) {
                    if agent.status == AgentStatus::Blocked {
                        let mut updated = agent.clone();
                        updated.status = AgentStatus::Working;
                        updated.updated_at_ms = now;
                        state.upsert_agent(updated);
                    }
                }
            }
        }
        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: escalation.from_agent_id.clone(),
            story_id: escalation.story_id.clone(),
            event_type: EventType::EscalationCreated,
            message: format!("escalation {} resolved: {resolution}", escalation.id),
            metadata: BTreeMap::new(),
            created_at_ms: now,
        });
        Ok(())
    })?;

    Ok(())
}

/// `hive approvals approve <id> -m "<resolution>"` — unblocks the agent.
pub fn approve(escalation_id: String, resolution: String) -> Result<(), ExitError> {
    let id = escalation_id.clone();
    resolve(escalation_id, resolution, true)?;
    println!("{} {id}", crate::color::good("Approved"));
    Ok(())
}

/// `hive approvals deny <id> -m "<resolution>"` — resolved without unblocking.
pub fn deny(escalation_id: String, resolution: String) -> Result<(), ExitError> {
    let id = escalation_id.clone();
    resolve(escalation_id, resolution, false)?;
    println!("{} {id}", crate::color::bad("Denied"));
    Ok(())
}
