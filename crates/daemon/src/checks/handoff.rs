// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stalled planning-handoff recovery (spec.md §4.3.3): stories stuck in
//! `estimated` past `stuck_threshold_ms` indicate the Tech Lead never
//! closed the handoff to `planned`. A two-stage policy, grouped per
//! requirement: nudge once, then, if the same group is still stalled after
//! `proactive_handoff_retry_delay_ms`, the manager promotes it itself.

use std::collections::{BTreeMap, HashMap};

use hive_core::{
    Effect, EventType, HiveConfig, LogEntry, LogEntryId, Requirement, RequirementId,
    RequirementStatus, RoleType, StoryId, StoryStatus,
};
use hive_core::{Clock, Escalation, EscalationId, EscalationStatus};
use hive_engine::{execute, EffectContext};
use hive_storage::Store;

use crate::checks::{reminder, CheckOutcome};
use crate::error::Result;
use crate::memory::{HandoffObservation, TickMemory};

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

    let mut groups: HashMap<RequirementId, Vec<StoryId>> = HashMap::new();
    let mut latest_updated: HashMap<RequirementId, u64> = HashMap::new();
    for story in state.stories.values() {
        if story.status != StoryStatus::Estimated {
            continue;
        }
        if now.saturating_sub(story.updated_at_ms) < config.timing.stuck_threshold_ms {
            continue;
        }
        groups.entry(story.requirement_id.clone()).or_default().push(story.id.clone());
        let entry = latest_updated.entry(story.requirement_id.clone()).or_insert(0);
        *entry = (*entry).max(story.updated_at_ms);
    }
    if groups.is_empty() {
        return Ok(outcome);
    }

    let tech_lead_session =
        state.alive_agents().find(|a| a.role == RoleType::TechLead).and_then(|a| a.session_name.clone());

    let mut nudged = 0usize;
    let mut promoted_groups = 0usize;
    let mut promoted_stories = 0usize;

    for (requirement_id, story_ids) in groups {
        let Some(requirement) = state.get_requirement(requirement_id.as_str()).cloned() else { continue };
        let signature = (story_ids.len(), latest_updated.get(&requirement_id).copied().unwrap_or(0));

        match memory.observe_handoff(&requirement_id, signature, now) {
            HandoffObservation::FirstDetection => {
                let Some(session_name) = tech_lead_session.clone() else { continue };
                if !memory.may_nudge(&session_name, now, config.timing.nudge_cooldown_ms) {
                    continue;
                }
                let text = reminder(format!(
                    "requirement {requirement_id} has {} stor{} still sitting in `estimated` — finish planning and hand them off to `planned`",
                    story_ids.len(),
                    if story_ids.len() == 1 { "y" } else { "ies" }
                ));
                match execute(
                    ctx,
                    &Effect::SendSessionMessageWithConfirmation { session_name: session_name.clone(), text },
                )
                .await
                {
                    Ok(_) => {
                        memory.record_nudge(&session_name, now);
                        nudged += 1;
                    }
                    Err(err) => outcome.push_error(format!("handoff nudge({session_name}) failed: {err}")),
                }
            }
            HandoffObservation::Repeated { first_detected_ms } => {
                if now.saturating_sub(first_detected_ms) < config.timing.proactive_handoff_retry_delay_ms {
                    continue;
                }

                let promoted = promote_group(store, &requirement_id, &story_ids, now)?;
                memory.forget_handoff(&requirement_id);
                if promoted == 0 {
                    continue;
                }
                promoted_groups += 1;
                promoted_stories += promoted;

                if let Err(msg) = run_scheduler_sequence(store, ctx, config, clock).await {
                    create_escalation(store, &requirement, now, &msg)?;
                    outcome.push_error(format!("handoff auto-promotion scheduling failed: {msg}"));
                }
            }
        }
    }

    if nudged > 0 {
        outcome.push_line(format!("handoff: nudged {nudged} tech-lead session(s)"));
    }
    if promoted_groups > 0 {
        outcome.push_line(format!(
            "handoff: auto-promoted {promoted_stories} stalled stor{} across {promoted_groups} requirement(s)",
            if promoted_stories == 1 { "y" } else { "ies" }
        ));
    }
    Ok(outcome)
}

fn promote_group(store: &Store, requirement_id: &RequirementId, story_ids: &[StoryId], now: u64) -> Result<usize> {
    let requirement_id = requirement_id.clone();
    let story_ids = story_ids.to_vec();
    let count = store.with_transaction(|state| {
        let mut promoted = 0usize;
        for story_id in &story_ids {
            let Some(fresh) = state.get_story(story_id.as_str()) else { continue };
            if fresh.status != StoryStatus::Estimated {
                continue;
            }
            let mut updated = fresh.clone();
            updated.status = StoryStatus::Planned;
            updated.updated_at_ms = now;
            state.upsert_story(updated);
            promoted += 1;
        }
        if promoted > 0 {
            if let Some(req) = state.get_requirement(requirement_id.as_str()) {
                let mut updated_req = req.clone();
                updated_req.status = RequirementStatus::Planned;
                updated_req.updated_at_ms = now;
                state.upsert_requirement(updated_req);
            }
            state.append_log_entry(LogEntry {
                id: LogEntryId::new(),
                agent_id: None,
                story_id: None,
                event_type: EventType::PlanningCompleted,
                message: format!(
                    "manager auto-promoted {promoted} stalled stor{} for requirement {requirement_id}",
                    if promoted == 1 { "y" } else { "ies" }
                ),
                metadata: BTreeMap::new(),
                created_at_ms: now,
            });
        }
        Ok(promoted)
    })?;
    Ok(count)
}

/// Runs the same `checkScaling → checkMergeQueue → assignStories` sequence
/// the Scheduler runs on its own, so the just-promoted stories are picked up
/// immediately rather than waiting for the next tick.
async fn run_scheduler_sequence(
    store: &Store,
    ctx: &EffectContext,
    config: &HiveConfig,
    clock: &impl Clock,
) -> std::result::Result<(), String> {
    hive_engine::check_scaling(store, ctx, config, clock).await.map_err(|e| e.to_string())?;
    hive_engine::check_merge_queue(store, ctx, config, clock).await.map_err(|e| e.to_string())?;
    let report = hive_engine::assign_stories(store, ctx, config, clock).await.map_err(|e| e.to_string())?;
    if !report.errors.is_empty() {
        return Err(report.errors.join("; "));
    }
    Ok(())
}

fn create_escalation(store: &Store, requirement: &Requirement, now: u64, reason: &str) -> Result<()> {
    let message = format!("requirement {}: {reason}", requirement.id);
    let reason = reason.to_string();
    store.with_transaction(|state| {
        state.upsert_escalation(Escalation {
            id: EscalationId::new(),
            story_id: None,
            from_agent_id: None,
            to_agent_id: None,
            reason,
            status: EscalationStatus::Pending,
            resolution: None,
            created_at_ms: now,
            updated_at_ms: now,
        });
        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: None,
            story_id: None,
            event_type: EventType::EscalationCreated,
            message,
            metadata: BTreeMap::new(),
            created_at_ms: now,
        });
        Ok(())
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_adapters::connectors::{FakePmConnector, FakeVcsConnector};
    use hive_adapters::FakeSessionAdapter;
    use hive_core::{Agent, AgentStatus, FakeClock, Requirement, Story, Team};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn test_ctx() -> EffectContext {
        EffectContext {
            sessions: Arc::new(FakeSessionAdapter::new()),
            vcs: Arc::new(FakeVcsConnector::new()),
            pm: Arc::new(FakePmConnector::new()),
        }
    }

    fn test_store() -> (Store, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path(), &HiveConfig::default()).unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn first_detection_nudges_the_tech_lead_session() {
        let (store, _dir) = test_store();
        let ctx = test_ctx();
        let config = HiveConfig::default();
        let clock = FakeClock::new();
        let mut memory = TickMemory::new();

        let requirement = Requirement::builder().build();
        let team = Team::builder().build();
        let story = Story::builder()
            .requirement_id(requirement.id.clone())
            .team_id(team.id.clone())
            .status(StoryStatus::Estimated)
            .build();
        let tech_lead = Agent::builder().role(RoleType::TechLead).status(AgentStatus::Working).session_name("hive-tech-lead-global".to_string()).build();

        clock.advance(std::time::Duration::from_millis(config.timing.stuck_threshold_ms + 1));
        store
            .with_transaction(|state| {
                state.upsert_requirement(requirement.clone());
                state.upsert_team(team.clone());
                state.upsert_story(story.clone());
                state.upsert_agent(tech_lead.clone());
                Ok(())
            })
            .unwrap();

        let outcome = run(&store, &ctx, &config, &clock, &mut memory).await.unwrap();
        assert!(outcome.lines.iter().any(|l| l.contains("nudged 1")));
    }

    #[tokio::test]
    async fn a_repeated_signature_after_the_retry_delay_promotes_the_group() {
        let (store, _dir) = test_store();
        let ctx = test_ctx();
        let config = HiveConfig::default();
        let clock = FakeClock::new();
        let mut memory = TickMemory::new();

        let requirement = Requirement::builder().build();
        let team = Team::builder().build();
        let story = Story::builder()
            .requirement_id(requirement.id.clone())
            .team_id(team.id.clone())
            .status(StoryStatus::Estimated)
            .build();

        clock.advance(std::time::Duration::from_millis(config.timing.stuck_threshold_ms + 1));
        store
            .with_transaction(|state| {
                state.upsert_requirement(requirement.clone());
                state.upsert_team(team.clone());
                state.upsert_story(story.clone());
                Ok(())
            })
            .unwrap();

        run(&store, &ctx, &config, &clock, &mut memory).await.unwrap();

        clock.advance(std::time::Duration::from_millis(config.timing.proactive_handoff_retry_delay_ms + 1));
        let outcome = run(&store, &ctx, &config, &clock, &mut memory).await.unwrap();

        assert!(outcome.lines.iter().any(|l| l.contains("auto-promoted")));
        let state = store.read();
        assert_eq!(state.get_story(story.id.as_str()).unwrap().status, StoryStatus::Planned);
        assert_eq!(state.get_requirement(requirement.id.as_str()).unwrap().status, RequirementStatus::Planned);
    }
}
