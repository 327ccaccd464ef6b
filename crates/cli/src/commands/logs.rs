// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive logs [--agent <id>] [--story <id>] [--since <epoch-ms>]`: query the
//! append-only log table. Every write path in this crate calls
//! `MaterializedState::append_log_entry` inside the same transaction as the
//! state change it narrates, so this is the audit trail for everything the
//! hive has done, not just what a human typed.

use crate::context;
use crate::exit_error::ExitError;

pub fn run(agent: Option<String>, story: Option<String>, since_ms: Option<u64>, limit: usize) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let state = ctx.store.read();

    let agent_id = agent.as_ref().map(|id| state.get_agent(id).map(|a| a.id.clone()).ok_or_else(|| ExitError::user(format!("no agent {id}")))).transpose()?;
    let story_id = story.as_ref().map(|id| state.get_story(id).map(|s| s.id.clone()).ok_or_else(|| ExitError::user(format!("no story {id}")))).transpose()?;

    let mut entries: Vec<_> = state
        .log_entries
        .values()
        .filter(|e| agent_id.as_ref().map_or(true, |id| e.agent_id.as_ref() == Some(id)))
        .filter(|e| story_id.as_ref().map_or(true, |id| e.story_id.as_ref() == Some(id)))
        .filter(|e| since_ms.map_or(true, |since| e.created_at_ms >= since))
        .collect();
    entries.sort_by_key(|e| e.created_at_ms);

    if entries.is_empty() {
        println!("no matching log entries");
        return Ok(());
    }

    for entry in entries.iter().rev().take(limit).rev() {
        let who = entry.agent_id.as_ref().map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
        let story = entry.story_id.as_ref().map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
        println!("{} {} [{}] {} {}", entry.created_at_ms, crate::color::context(&entry.event_type.to_string()), who, story, entry.message);
    }
    Ok(())
}
