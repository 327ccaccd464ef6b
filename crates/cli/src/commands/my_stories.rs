// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive my-stories [session] [--all]` and its `claim|complete|refactor`
//! subcommands (spec.md §6): the view and mutation surface a worker session
//! uses to see and advance its own backlog.

use std::collections::BTreeMap;

use hive_core::{AgentStatus, EventType, LogEntry, LogEntryId, Story, StoryStatus};
use serde::Serialize;

use crate::context;
use crate::exit_error::ExitError;
use crate::output::{self, OutputFormat};

#[derive(Serialize)]
struct StoryRow {
    id: String,
    title: String,
    status: String,
    complexity: u8,
}

/// `hive my-stories [session] [--all]` — list stories assigned to one agent.
pub fn list(session: Option<String>, all: bool, format: OutputFormat) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let agent_id = context::agent_for_session(&ctx, &session)?;
    let state = ctx.store.read();

    let mut rows: Vec<StoryRow> = state
        .stories
        .values()
        .filter(|s| s.assigned_agent_id.as_ref() == Some(&agent_id))
        .filter(|s| all || s.status != StoryStatus::Merged)
        .map(|s| StoryRow { id: s.id.to_string(), title: s.title.clone(), status: s.status.to_string(), complexity: s.complexity })
        .collect();
    rows.sort_by(|a, b| a.id.cmp(&b.id));

    output::handle_list(format, &rows, "no assigned stories", |rows| {
        for row in rows {
            println!("{}  {}  {} (complexity {})", crate::color::context(&row.id), row.status, row.title, row.complexity);
        }
    })
    .map_err(|e| ExitError::internal(e.to_string()))
}

fn load_owned_story(ctx: &context::HiveContext, story_id: &str, agent_id: &hive_core::AgentId) -> Result<Story, ExitError> {
    let state = ctx.store.read();
    let story = state.get_story(story_id).cloned().ok_or_else(|| ExitError::user(format!("no story {story_id}")))?;
    if story.assigned_agent_id.as_ref() != Some(agent_id) {
        return Err(ExitError::user(format!("story {} is not assigned to this agent", story.id)));
    }
    Ok(story)
}

/// `hive my-stories claim <story>` — start work on an assigned story.
pub fn claim(story_id: String, session: Option<String>) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let agent_id = context::agent_for_session(&ctx, &session)?;
    let story = load_owned_story(&ctx, &story_id, &agent_id)?;
    let now = ctx.now_ms();

    if !StoryStatus::is_forward_transition(story.status, StoryStatus::InProgress) {
        return Err(ExitError::user(format!("cannot move story {} from {} to in_progress", story.id, story.status)));
    }

    ctx.store.with_transaction(|state| {
        if let Some(fresh) = state.get_story(story.id.as_str()) {
            let mut updated = fresh.clone();
            updated.status = StoryStatus::InProgress;
            updated.updated_at_ms = now;
            state.upsert_story(updated);
        }
        if let Some(agent) = state.get_agent(agent_id.as_str()) {
            let mut updated = agent.clone();
            updated.status = AgentStatus::Working;
            updated.current_story_id = Some(story.id.clone());
            updated.last_seen_ms = now;
            updated.updated_at_ms = now;
            state.upsert_agent(updated);
        }
        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: Some(agent_id.clone()),
            story_id: Some(story.id.clone()),
            event_type: EventType::StoryStarted,
            message: format!("story {} claimed", story.id),
            metadata: BTreeMap::new(),
            created_at_ms: now,
        });
        Ok(())
    })?;

    println!("{} {}", crate::color::header("Claimed"), story.id);
    Ok(())
}

/// `hive my-stories complete <story>` — move a story into review.
pub fn complete(story_id: String, session: Option<String>) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let agent_id = context::agent_for_session(&ctx, &session)?;
    let story = load_owned_story(&ctx, &story_id, &agent_id)?;
    let now = ctx.now_ms();

    if !StoryStatus::is_forward_transition(story.status, StoryStatus::Review) {
        return Err(ExitError::user(format!("cannot move story {} from {} to review", story.id, story.status)));
    }

    ctx.store.with_transaction(|state| {
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
        Ok(())
    })?;

    println!("{} {} (run `hive pr submit {}` next)", crate::color::header("Ready for review:"), story.id, story.id);
    Ok(())
}

/// `hive my-stories refactor <story> -m "<reason>"` — a QA rejection was
/// acknowledged and the story is being taken back into active rework. The
/// story must already be `qa_failed`.
pub fn refactor(story_id: String, session: Option<String>, reason: String) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let agent_id = context::agent_for_session(&ctx, &session)?;
    let story = load_owned_story(&ctx, &story_id, &agent_id)?;
    let now = ctx.now_ms();

    if story.status != StoryStatus::QaFailed {
        return Err(ExitError::user(format!("story {} is {}, not qa_failed", story.id, story.status)));
    }

    ctx.store.with_transaction(|state| {
        if let Some(fresh) = state.get_story(story.id.as_str()) {
            let mut updated = fresh.clone();
            updated.status = StoryStatus::InProgress;
            updated.updated_at_ms = now;
            state.upsert_story(updated);
        }
        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: Some(agent_id.clone()),
            story_id: Some(story.id.clone()),
            event_type: EventType::StoryProgressUpdate,
            message: format!("story {} back into rework: {reason}", story.id),
            metadata: BTreeMap::new(),
            created_at_ms: now,
        });
        Ok(())
    })?;

    println!("{} {}", crate::color::header("Back into rework:"), story.id);
    Ok(())
}
