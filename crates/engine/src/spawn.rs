// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent-spawn protocol (spec.md §4.2): insert the agent row, compute a
//! collision-free session name, create the session, deliver the role's
//! first prompt, then record what actually happened.

use std::collections::BTreeMap;
use std::path::PathBuf;

use hive_core::{
    Agent, AgentId, AgentStatus, CliFlavor, Clock, Effect, EventType, HiveConfig, LogEntry,
    LogEntryId, RoleType, Team,
};
use hive_storage::Store;

use crate::effects::{execute, EffectContext};
use crate::error::Result;
use crate::prompts::{self, PromptContext};

/// Inputs to one call of [`spawn_agent`]. `team` is `None` only for the
/// process-wide `tech_lead`.
pub struct SpawnRequest<'a> {
    pub role: RoleType,
    pub team: Option<&'a Team>,
    pub cli_flavor: CliFlavor,
    pub target_branch: &'a str,
    pub progress_updates_enabled: bool,
}

/// Run the full spawn protocol. Returns the new agent's id whether or not
/// the spawn succeeded — on failure the agent row is left behind, marked
/// `terminated`, so the caller and the Scheduler's next pass can see why.
pub async fn spawn_agent(
    store: &Store,
    ctx: &EffectContext,
    config: &HiveConfig,
    clock: &impl Clock,
    req: SpawnRequest<'_>,
) -> Result<AgentId> {
    let now = clock.epoch_ms();

    // Step 1: insert the agent row.
    let agent = Agent {
        id: AgentId::generate(req.role),
        role: req.role,
        team_id: req.team.map(|t| t.id),
        session_name: None,
        cli_flavor: req.cli_flavor,
        status: AgentStatus::Working,
        current_story_id: None,
        memory_path: None,
        last_seen_ms: now,
        created_at_ms: now,
        updated_at_ms: now,
    };
    let agent_id = agent.id.clone();
    store.with_transaction(|state| {
        state.upsert_agent(agent.clone());
        Ok(())
    })?;

    // Step 2: compute a collision-free session name.
    let team_slug = req.team.map(|t| hive_core::team_slug(&t.display_name)).unwrap_or_else(|| "global".to_string());
    let base_name = format!("hive-{}-{}", req.role.id_prefix(), team_slug);
    let session_name = unique_session_name(ctx, &base_name).await?;

    // Steps 3-4: create the session and deliver the first prompt.
    let work_dir = req.team.map(|t| t.repo_path.clone()).unwrap_or_else(|| PathBuf::from("."));
    let cli = config.cli_command(req.cli_flavor);
    let mut argv = vec![cli.command];
    argv.extend(cli.extra_args);

    let repo_path_display = work_dir.to_string_lossy().into_owned();
    let prompt_ctx = PromptContext {
        team_name: req.team.map(|t| t.display_name.as_str()).unwrap_or("(process-wide)"),
        repo_url: req.team.map(|t| t.repo_url.as_str()).unwrap_or(""),
        repo_path: &repo_path_display,
        session_name: &session_name,
        target_branch: req.target_branch,
        progress_updates_enabled: req.progress_updates_enabled,
    };
    let first_message = prompts::render(req.role, &prompt_ctx);

    let spawn_result = run_spawn_io(ctx, &agent_id, &session_name, &work_dir, &argv, &first_message).await;

    // Step 5: record the outcome.
    match spawn_result {
        Ok(()) => {
            store.with_transaction(|state| {
                if let Some(existing) = state.get_agent(agent_id.as_str()) {
                    let mut updated = existing.clone();
                    updated.session_name = Some(session_name.clone());
                    updated.updated_at_ms = now;
                    state.upsert_agent(updated);
                }
                state.append_log_entry(LogEntry {
                    id: LogEntryId::new(),
                    agent_id: Some(agent_id.clone()),
                    story_id: None,
                    event_type: EventType::AgentSpawned,
                    message: format!("spawned session {session_name}"),
                    metadata: BTreeMap::new(),
                    created_at_ms: now,
                });
                Ok(())
            })?;
            Ok(agent_id)
        }
        Err(err) => {
            let message = err.to_string();
            store.with_transaction(|state| {
                if let Some(existing) = state.get_agent(agent_id.as_str()) {
                    let mut updated = existing.clone();
                    updated.status = AgentStatus::Terminated;
                    updated.updated_at_ms = now;
                    state.upsert_agent(updated);
                }
                let mut metadata = BTreeMap::new();
                metadata.insert("error".to_string(), message.clone());
                state.append_log_entry(LogEntry {
                    id: LogEntryId::new(),
                    agent_id: Some(agent_id.clone()),
                    story_id: None,
                    event_type: EventType::AgentSpawned,
                    message: format!("spawn failed: {message}"),
                    metadata,
                    created_at_ms: now,
                });
                Ok(())
            })?;
            Err(err)
        }
    }
}

/// `hive-<role>-<teamSlug>`, appending a monotonic `-n` suffix on collision
/// with a session the Supervisor already knows about.
async fn unique_session_name(ctx: &EffectContext, base_name: &str) -> Result<String> {
    if !ctx.sessions.is_running(base_name).await? {
        return Ok(base_name.to_string());
    }
    for n in 2.. {
        let candidate = format!("{base_name}-{n}");
        if !ctx.sessions.is_running(&candidate).await? {
            return Ok(candidate);
        }
    }
    unreachable!("session-name suffix search is unbounded")
}

async fn run_spawn_io(
    ctx: &EffectContext,
    agent_id: &AgentId,
    session_name: &str,
    work_dir: &std::path::Path,
    argv: &[String],
    first_message: &str,
) -> Result<()> {
    execute(
        ctx,
        &Effect::CreateSession {
            agent_id: agent_id.clone(),
            session_name: session_name.to_string(),
            work_dir: work_dir.to_path_buf(),
            argv: argv.to_vec(),
        },
    )
    .await?;

    execute(
        ctx,
        &Effect::SendSessionMessage { session_name: session_name.to_string(), text: first_message.to_string() },
    )
    .await?;

    execute(ctx, &Effect::SendSessionEnter { session_name: session_name.to_string() }).await?;

    Ok(())
}
