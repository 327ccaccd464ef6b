// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive plan submit` — the Tech Lead's structured planning call (spec.md
//! §9 design notes: "the in-process agent abstraction... exists solely to
//! produce the role-specific first prompt and to mediate the one-shot
//! planning call for Tech Lead"). Not itself named in spec.md's CLI-surface
//! list (which the spec marks "contract, not implementation"), but it is
//! the one sanctioned channel through which the Tech Lead's session turns a
//! `planning` requirement into `draft` stories — every other agent-facing
//! mutation goes through an explicit `hive` subcommand, and story creation
//! cannot be the exception.
//!
//! Reads a JSON array of story drafts from stdin:
//! `[{"team": "...", "title": "...", "description": "...",
//!    "acceptance_criteria": [...], "complexity": 5,
//!    "story_points": 3, "depends_on": ["<title>", ...]}]`
//! `depends_on` entries refer to other drafts in the same submission by
//! title, resolved to ids once every draft has been inserted.
//!
//! If any draft sets `"needs_human_input": true`, no stories are created;
//! instead a human escalation is raised and the Tech Lead is marked
//! `blocked` (spec.md §8 scenario 2).

use std::collections::{BTreeMap, HashMap};
use std::io::Read;

use hive_core::{
    AgentId, AgentStatus, Escalation, EscalationId, EscalationStatus, EventType, LogEntry, LogEntryId, RequirementId,
    RequirementStatus, RoleType, Story, StoryId, StoryStatus, TeamId,
};
use serde::Deserialize;

use crate::context;
use crate::exit_error::ExitError;

#[derive(Debug, Deserialize)]
struct StoryDraft {
    team: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    acceptance_criteria: Vec<String>,
    complexity: u8,
    #[serde(default)]
    story_points: u32,
    #[serde(default)]
    depends_on: Vec<String>,
    #[serde(default)]
    needs_human_input: bool,
    #[serde(default)]
    reason: Option<String>,
}

pub fn run(requirement_id: String, session: Option<String>) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let now = ctx.now_ms();

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| ExitError::internal(format!("failed to read stdin: {e}")))?;
    let drafts: Vec<StoryDraft> =
        serde_json::from_str(&input).map_err(|e| ExitError::user(format!("invalid plan JSON: {e}")))?;

    let state = ctx.store.read();
    let requirement = state
        .get_requirement(&requirement_id)
        .cloned()
        .ok_or_else(|| ExitError::user(format!("no requirement {requirement_id}")))?;
    let requirement_id = requirement.id.clone();

    let tech_lead = state
        .alive_agents()
        .find(|a| a.role == RoleType::TechLead && session.as_deref().map_or(true, |s| a.session_name.as_deref() == Some(s)))
        .map(|a| a.id.clone());
    drop(state);

    if let Some(ambiguous) = drafts.iter().find(|d| d.needs_human_input) {
        let reason = ambiguous.reason.clone().unwrap_or_else(|| "tech lead flagged ambiguity".to_string());
        raise_ambiguity_escalation(&ctx, &requirement_id, tech_lead.as_ref(), &reason, now)?;
        println!("{}", crate::color::bad("Escalated: requirement needs human input before planning can continue"));
        return Ok(());
    }

    if drafts.is_empty() {
        return Err(ExitError::user("plan submission contained no stories"));
    }

    let mut team_ids: HashMap<String, TeamId> = HashMap::new();
    {
        let state = ctx.store.read();
        for draft in &drafts {
            if team_ids.contains_key(&draft.team) {
                continue;
            }
            let team = state
                .teams
                .values()
                .find(|t| t.display_name.eq_ignore_ascii_case(&draft.team))
                .ok_or_else(|| ExitError::user(format!("no team named \"{}\"", draft.team)))?;
            team_ids.insert(draft.team.clone(), team.id);
        }
    }

    let mut title_to_id: HashMap<String, StoryId> = HashMap::new();
    let mut stories: Vec<Story> = Vec::with_capacity(drafts.len());
    for draft in &drafts {
        let story = Story {
            id: StoryId::new(),
            requirement_id: requirement_id.clone(),
            team_id: team_ids[&draft.team],
            title: draft.title.clone(),
            description: draft.description.clone(),
            acceptance_criteria: draft.acceptance_criteria.clone(),
            complexity: draft.complexity.clamp(1, 13),
            story_points: draft.story_points,
            dependency_set: Vec::new(),
            assigned_agent_id: None,
            branch_name: None,
            status: StoryStatus::Estimated,
            pm_keys: Default::default(),
            in_sprint: false,
            created_at_ms: now,
            updated_at_ms: now,
        };
        title_to_id.insert(draft.title.clone(), story.id.clone());
        stories.push(story);
    }

    for (draft, story) in drafts.iter().zip(stories.iter_mut()) {
        for dep_title in &draft.depends_on {
            if let Some(dep_id) = title_to_id.get(dep_title) {
                story.add_dependency(dep_id.clone());
            }
        }
    }

    let created = stories.len();
    ctx.store.with_transaction(|state| {
        for story in &stories {
            state.upsert_story(story.clone());
            state.append_log_entry(LogEntry {
                id: LogEntryId::new(),
                agent_id: tech_lead.clone(),
                story_id: Some(story.id.clone()),
                event_type: EventType::StoryCreated,
                message: format!("story \"{}\" created", story.title),
                metadata: BTreeMap::new(),
                created_at_ms: now,
            });
        }
        if let Some(fresh) = state.get_requirement(requirement_id.as_str()) {
            let mut updated = fresh.clone();
            updated.status = RequirementStatus::Planned;
            updated.updated_at_ms = now;
            state.upsert_requirement(updated);
        }
        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: tech_lead.clone(),
            story_id: None,
            event_type: EventType::PlanningCompleted,
            message: format!("planning completed for {requirement_id}: {created} stor{} created", if created == 1 { "y" } else { "ies" }),
            metadata: BTreeMap::new(),
            created_at_ms: now,
        });
        Ok(())
    })?;

    println!("{} {created} stor{} for {requirement_id}", crate::color::header("Planned"), if created == 1 { "y" } else { "ies" });
    Ok(())
}

fn raise_ambiguity_escalation(
    ctx: &context::HiveContext,
    requirement_id: &RequirementId,
    tech_lead: Option<&AgentId>,
    reason: &str,
    now: u64,
) -> Result<(), ExitError> {
    let requirement_id = requirement_id.clone();
    let tech_lead = tech_lead.cloned();
    let reason = reason.to_string();
    ctx.store.with_transaction(|state| {
        state.upsert_escalation(Escalation {
            id: EscalationId::new(),
            story_id: None,
            from_agent_id: tech_lead.clone(),
            to_agent_id: None,
            reason: reason.clone(),
            status: EscalationStatus::Pending,
            resolution: None,
            created_at_ms: now,
            updated_at_ms: now,
        });
        if let Some(id) = &tech_lead {
            if let Some(agent) = state.get_agent(id.as_str()) {
                let mut updated = agent.clone();
                updated.status = AgentStatus::Blocked;
                updated.updated_at_ms = now;
                state.upsert_agent(updated);
            }
        }
        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: tech_lead.clone(),
            story_id: None,
            event_type: EventType::EscalationCreated,
            message: format!("requirement {requirement_id} needs human input: {reason}"),
            metadata: BTreeMap::new(),
            created_at_ms: now,
        });
        Ok(())
    })?;
    Ok(())
}
