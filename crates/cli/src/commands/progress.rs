// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive progress <story> -m "<text>" [--done]` (spec.md §6): a worker
//! session's narration channel, separate from the status transitions
//! `my-stories claim|complete` make explicit. `--done` is shorthand for
//! following the progress note with the same review handoff
//! `my-stories complete` performs, since a worker narrating "done" and then
//! having to remember a second command is exactly the friction this verb
//! exists to remove.

use std::collections::BTreeMap;

use hive_core::{EventType, LogEntry, LogEntryId, StoryStatus};

use crate::context;
use crate::exit_error::ExitError;

pub fn run(story_id: String, message: String, done: bool, session: Option<String>) -> Result<(), ExitError> {
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

    if done && !StoryStatus::is_forward_transition(story.status, StoryStatus::Review) {
        return Err(ExitError::user(format!("cannot move story {} from {} to review", story.id, story.status)));
    }

    ctx.store.with_transaction(|state| {
        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: Some(agent_id.clone()),
            story_id: Some(story.id.clone()),
            event_type: EventType::StoryProgressUpdate,
            message: message.clone(),
            metadata: BTreeMap::new(),
            created_at_ms: now,
        });

        if done {
            if let Some(fresh) = state.get_story(story.id.as_str()) {
                let mut updated = fresh.clone();
                updated.status = StoryStatus::Review;
                updated.updated_at_ms = now;
                state.upsert_story(updated);
            }
            state.append_log_entry(LogEntry {
                id: LogEntryId::new(),
                agent_id: Some(agent_id.clone()),
                story_id: Some(story.id.clone()),
                event_type: EventType::StoryReviewRequested,
                message: format!("story {} marked ready for review", story.id),
                metadata: BTreeMap::new(),
                created_at_ms: now,
            });
        }
        Ok(())
    })?;

    if done {
        println!("{} {} (run `hive pr submit {}` next)", crate::color::header("Ready for review:"), story.id, story.id);
    } else {
        println!("{} {}", crate::color::header("Progress recorded:"), story.id);
    }
    Ok(())
}
