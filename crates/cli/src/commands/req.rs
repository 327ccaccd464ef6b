// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive req "<text>"` / `hive req <epic-url>` (spec.md §6): submit a
//! requirement. Ensures a (process-wide, singleton) Tech Lead agent is
//! alive, hands it the requirement, and transitions `pending → planning`.
//! The actual decomposition into stories happens inside the Tech Lead's own
//! session and lands back through `hive my-stories` / the planning-handoff
//! recovery check (spec.md §4.3.3) — this command only mediates the
//! one-shot planning call's kickoff (spec.md §9, design notes).

use std::collections::BTreeMap;

use hive_core::{AgentStatus, CliFlavor, Effect, EventType, LogEntry, LogEntryId, Requirement, RequirementId, RequirementStatus, RoleType};
use hive_engine::{execute, spawn_agent, SpawnRequest};

use crate::context;
use crate::exit_error::ExitError;

pub async fn run(text_or_url: String, godmode: bool) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let now = ctx.now_ms();

    let (title, description, external_epic_key) = if looks_like_url(&text_or_url) {
        match ctx.effects.pm.fetch_epic(&text_or_url).await {
            Ok(epic) => (epic.title, epic.description, Some(epic.key)),
            Err(err) => {
                return Err(ExitError::user(format!("failed to import epic from {text_or_url}: {err}")));
            }
        }
    } else {
        (first_line(&text_or_url), text_or_url.clone(), None)
    };

    let submitter = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    let requirement = Requirement {
        id: RequirementId::new(),
        title,
        description,
        submitter,
        status: RequirementStatus::Pending,
        external_epic_key,
        feature_branch: None,
        target_branch: "main".to_string(),
        godmode,
        created_at_ms: now,
        updated_at_ms: now,
    };

    ctx.store.with_transaction(|state| {
        state.upsert_requirement(requirement.clone());
        Ok(())
    })?;

    // Ensure the singleton Tech Lead is alive, spawning it if this is the
    // first requirement or the prior one was spun down.
    let existing_tech_lead =
        ctx.store.read().alive_agents().find(|a| a.role == RoleType::TechLead).map(|a| a.id.clone());

    let tech_lead_id = match existing_tech_lead {
        Some(id) => id,
        None => {
            let spawn_req = SpawnRequest {
                role: RoleType::TechLead,
                team: None,
                cli_flavor: CliFlavor::Claude,
                target_branch: &requirement.target_branch,
                progress_updates_enabled: true,
            };
            spawn_agent(&ctx.store, &ctx.effects, &ctx.config, &ctx.clock, spawn_req)
                .await
                .map_err(|e| ExitError::internal(format!("failed to spawn tech lead: {e}")))?
        }
    };

    let session_name = ctx.store.read().get_agent(tech_lead_id.as_str()).and_then(|a| a.session_name.clone());

    if let Some(session_name) = session_name {
        let message = format!(
            "New requirement {} submitted by {}:\n\nTitle: {}\n\n{}\n\nDecompose this into stories and run `hive plan submit` when ready.",
            requirement.id, requirement.submitter, requirement.title, requirement.description
        );
        let _ = execute(&ctx.effects, &Effect::SendSessionMessageWithConfirmation { session_name, text: message }).await;
    }

    let now = ctx.now_ms();
    ctx.store.with_transaction(|state| {
        if let Some(fresh) = state.get_requirement(requirement.id.as_str()) {
            let mut updated = fresh.clone();
            updated.status = RequirementStatus::Planning;
            updated.updated_at_ms = now;
            state.upsert_requirement(updated);
        }
        if let Some(agent) = state.get_agent(tech_lead_id.as_str()) {
            let mut updated = agent.clone();
            updated.status = AgentStatus::Working;
            updated.last_seen_ms = now;
            updated.updated_at_ms = now;
            state.upsert_agent(updated);
        }
        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: Some(tech_lead_id.clone()),
            story_id: None,
            event_type: EventType::PlanningStarted,
            message: format!("planning started for {}", requirement.id),
            metadata: BTreeMap::new(),
            created_at_ms: now,
        });
        Ok(())
    })?;

    println!(
        "{} {} ({})",
        crate::color::header("Submitted requirement"),
        requirement.title,
        crate::color::context(requirement.id.as_str())
    );
    Ok(())
}

fn looks_like_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

fn first_line(s: &str) -> String {
    let line = s.lines().next().unwrap_or(s);
    let trimmed = line.trim();
    if trimmed.chars().count() > 80 {
        format!("{}…", trimmed.chars().take(80).collect::<String>())
    } else {
        trimmed.to_string()
    }
}
