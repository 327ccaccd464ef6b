// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive approach <story> -m "<text>"` (spec.md §6): a worker declares its
//! intended approach before diving into a story, logged the same way
//! `hive progress` narrates in-flight work — the distinction is purely in
//! when an agent's system prompt is told to call it, not in what the Log
//! entry records.

use std::collections::BTreeMap;

use hive_core::{EventType, LogEntry, LogEntryId};

use crate::context;
use crate::exit_error::ExitError;

pub fn run(story_id: String, message: String, session: Option<String>) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let agent_id = context::agent_for_session(&ctx, &session)?;
    let now = ctx.now_ms();

    let story = {
        let state = ctx.store.read();
        let story = state.get_story(&story_id).cloned().ok_or_else(|| ExitError::user(format!("no story {story_id}")))?;
        if story.assigned_agent_id.as_ref() != Some(&agent_id) {
            return Err(ExitError::user(format!("story {} is not assigned to this agent", story.id)));
        }
        story
    };

    ctx.store.with_transaction(|state| {
        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: Some(agent_id.clone()),
            story_id: Some(story.id.clone()),
            event_type: EventType::StoryProgressUpdate,
            message: format!("approach: {message}"),
            metadata: BTreeMap::new(),
            created_at_ms: now,
        });
        Ok(())
    })?;

    println!("{} {}", crate::color::header("Approach recorded:"), story.id);
    Ok(())
}
