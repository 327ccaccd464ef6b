// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spin-down (spec.md §4.3.4): retire agents whose work is done.
//!
//! Merged-story spin-down drains and kills an agent whose only remaining
//! assignment has merged; if it still has other active work, only the
//! merged story's assignment is cleared. Idle-worker spin-down retires any
//! non-tech-lead worker still `working` once the backlog is empty.

use std::collections::BTreeMap;
use std::time::Duration;

use hive_core::{Agent, AgentId, AgentStatus, Effect, EventType, HiveConfig, LogEntry, LogEntryId, RoleType, Story, StoryId, StoryStatus};
use hive_core::Clock;
use hive_engine::{execute, EffectContext};
use hive_storage::Store;

use crate::checks::{reminder, CheckOutcome};
use crate::error::Result;

pub async fn run(store: &Store, ctx: &EffectContext, config: &HiveConfig, clock: &impl Clock) -> Result<CheckOutcome> {
    let now = clock.epoch_ms();
    let state = store.read();
    let mut outcome = CheckOutcome::empty();
    let mut drained = 0usize;
    let mut cleared = 0usize;

    let merged_assignments: Vec<(Story, Agent)> = state
        .stories
        .values()
        .filter(|s| s.status == StoryStatus::Merged)
        .filter_map(|s| {
            let agent_id = s.assigned_agent_id.as_ref()?;
            let agent = state.get_agent(agent_id.as_str())?;
            agent.is_alive().then(|| (s.clone(), agent.clone()))
        })
        .collect();

    for (story, agent) in merged_assignments {
        let has_other_active_work = state.stories.values().any(|s| {
            s.id != story.id
                && s.assigned_agent_id.as_ref() == Some(&agent.id)
                && !matches!(s.status, StoryStatus::Merged | StoryStatus::Draft)
        });

        if has_other_active_work {
            clear_assignment(store, &story.id, now)?;
            cleared += 1;
            continue;
        }

        match drain_and_kill(ctx, &agent, "congratulations, your story has merged — spinning down this session", config.timing.spin_down_drain_ms)
            .await
        {
            Ok(()) => {
                terminate_agent(store, &agent.id, now)?;
                drained += 1;
            }
            Err(err) => outcome.push_error(err),
        }
    }

    let has_active_backlog = state.stories.values().any(|s| {
        matches!(
            s.status,
            StoryStatus::Planned
                | StoryStatus::InProgress
                | StoryStatus::Review
                | StoryStatus::Qa
                | StoryStatus::QaFailed
                | StoryStatus::PrSubmitted
        )
    });

    if !has_active_backlog {
        let idle_workers: Vec<Agent> = state
            .alive_agents()
            .filter(|a| a.role != RoleType::TechLead && a.status == AgentStatus::Working)
            .cloned()
            .collect();

        for agent in idle_workers {
            match drain_and_kill(ctx, &agent, "no work remains in the queue — spinning down this session", config.timing.spin_down_drain_ms)
                .await
            {
                Ok(()) => {
                    terminate_agent(store, &agent.id, now)?;
                    drained += 1;
                }
                Err(err) => outcome.push_error(err),
            }
        }
    }

    if drained > 0 {
        outcome.push_line(format!("spin_down: drained {drained} session(s)"));
    }
    if cleared > 0 {
        outcome.push_line(format!("spin_down: cleared {cleared} merged assignment(s) with other active work"));
    }
    Ok(outcome)
}

/// Message the session, wait the configured drain interval, then kill it.
/// Returns a display-ready error string rather than propagating, since one
/// agent's failed spin-down should not stop the others.
async fn drain_and_kill(ctx: &EffectContext, agent: &Agent, message: &str, drain_ms: u64) -> std::result::Result<(), String> {
    let Some(session_name) = agent.session_name.clone() else {
        return Ok(());
    };

    execute(ctx, &Effect::SendSessionMessageWithConfirmation { session_name: session_name.clone(), text: reminder(message) })
        .await
        .map_err(|err| format!("spin_down notify({session_name}) failed: {err}"))?;

    tokio::time::sleep(Duration::from_millis(drain_ms)).await;

    execute(ctx, &Effect::KillSession { session_name: session_name.clone(), agent_id: agent.id.clone() })
        .await
        .map_err(|err| format!("spin_down kill({session_name}) failed: {err}"))?;
    Ok(())
}

fn clear_assignment(store: &Store, story_id: &StoryId, now: u64) -> Result<()> {
    let story_id = story_id.clone();
    store.with_transaction(|state| {
        if let Some(story) = state.get_story(story_id.as_str()) {
            let mut updated = story.clone();
            updated.assigned_agent_id = None;
            updated.updated_at_ms = now;
            state.upsert_story(updated);
        }
        Ok(())
    })
}

fn terminate_agent(store: &Store, agent_id: &AgentId, now: u64) -> Result<()> {
    let agent_id = agent_id.clone();
    store.with_transaction(|state| {
        if let Some(agent) = state.get_agent(agent_id.as_str()) {
            if agent.status == AgentStatus::Terminated {
                return Ok(());
            }
            let mut updated = agent.clone();
            updated.status = AgentStatus::Terminated;
            updated.current_story_id = None;
            updated.updated_at_ms = now;
            state.upsert_agent(updated);
        }
        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: Some(agent_id.clone()),
            story_id: None,
            event_type: EventType::AgentTerminated,
            message: "spun down by manager".to_string(),
            metadata: BTreeMap::new(),
            created_at_ms: now,
        });
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_adapters::connectors::{FakePmConnector, FakeVcsConnector};
    use hive_adapters::FakeSessionAdapter;
    use hive_core::{FakeClock, Team};
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
    async fn a_solely_assigned_merged_story_spins_down_its_agent() {
        let (store, _dir) = test_store();
        let ctx = test_ctx();
        let mut config = HiveConfig::default();
        config.timing.spin_down_drain_ms = 1;
        let clock = FakeClock::new();

        let team = Team::builder().build();
        let agent = Agent::builder().role(RoleType::Senior).team_id(team.id.clone()).status(AgentStatus::Working).session_name("hive-senior-a".to_string()).build();
        ctx.sessions.create_session("hive-senior-a", &std::path::PathBuf::from("/tmp"), &[]).await.unwrap();
        let mut story = Story::builder().team_id(team.id.clone()).status(StoryStatus::Merged).build();
        story.assigned_agent_id = Some(agent.id.clone());

        store
            .with_transaction(|state| {
                state.upsert_team(team.clone());
                state.upsert_agent(agent.clone());
                state.upsert_story(story.clone());
                Ok(())
            })
            .unwrap();

        let outcome = run(&store, &ctx, &config, &clock).await.unwrap();
        assert!(outcome.lines.iter().any(|l| l.contains("drained 1")));
        let state = store.read();
        assert_eq!(state.get_agent(agent.id.as_str()).unwrap().status, AgentStatus::Terminated);
    }

    #[tokio::test]
    async fn a_merged_story_with_other_active_work_only_clears_the_assignment() {
        let (store, _dir) = test_store();
        let ctx = test_ctx();
        let config = HiveConfig::default();
        let clock = FakeClock::new();

        let team = Team::builder().build();
        let agent = Agent::builder().role(RoleType::Senior).team_id(team.id.clone()).status(AgentStatus::Working).session_name("hive-senior-a".to_string()).build();
        let mut merged = Story::builder().team_id(team.id.clone()).status(StoryStatus::Merged).build();
        merged.assigned_agent_id = Some(agent.id.clone());
        let mut active = Story::builder().team_id(team.id.clone()).status(StoryStatus::InProgress).build();
        active.assigned_agent_id = Some(agent.id.clone());

        store
            .with_transaction(|state| {
                state.upsert_team(team.clone());
                state.upsert_agent(agent.clone());
                state.upsert_story(merged.clone());
                state.upsert_story(active.clone());
                Ok(())
            })
            .unwrap();

        let outcome = run(&store, &ctx, &config, &clock).await.unwrap();
        assert!(outcome.lines.iter().any(|l| l.contains("cleared 1")));
        let state = store.read();
        assert!(state.get_story(merged.id.as_str()).unwrap().assigned_agent_id.is_none());
        assert_eq!(state.get_agent(agent.id.as_str()).unwrap().status, AgentStatus::Working);
    }
}
