// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Feature sign-off (spec.md §4.3.7): once every story of an `in_progress`
//! requirement has merged, drive one end-to-end verification pass over its
//! integration branch before the requirement is considered done.
//!
//! Two halves, run every tick: trigger (spawn a `feature_test` agent and
//! move the requirement to `sign_off`) and resolve (poll that agent's pane
//! for a verdict marker and land the result). A requirement leaves
//! `sign_off` the moment its verdict is read, so a verdict is never applied
//! twice even though nothing here is tracked in memory across ticks.

use std::collections::BTreeMap;
use std::time::Duration;

use hive_core::{
    Agent, Clock, Effect, EventType, HiveConfig, LogEntry, LogEntryId, Requirement,
    RequirementId, RequirementStatus, RoleType, StoryStatus, TeamId,
};
use hive_engine::{execute, spawn_feature_test, EffectContext};
use hive_storage::Store;

use crate::checks::CheckOutcome;
use crate::error::Result;

/// Pane capture depth for a feature-test session's verdict poll. Generous
/// relative to `stuck.rs`'s liveness probe since an end-to-end run's final
/// report can run long.
const CAPTURE_LINES: usize = 200;

const PASS_MARKER: &str = "E2E tests PASSED";
const FAIL_MARKER: &str = "E2E tests FAILED";

pub async fn run(store: &Store, ctx: &EffectContext, config: &HiveConfig, clock: &impl Clock) -> Result<CheckOutcome> {
    let now = clock.epoch_ms();
    let state = store.read();
    let mut outcome = CheckOutcome::empty();

    let triggerable: Vec<(Requirement, TeamId, String)> = state
        .requirements
        .values()
        .filter(|r| r.status == RequirementStatus::InProgress)
        .filter(|r| r.feature_branch.is_some() || r.target_branch != "main")
        .filter_map(|r| {
            let mut stories = state.stories_for_requirement(&r.id).peekable();
            stories.peek()?;
            if !stories.clone().all(|s| s.status == StoryStatus::Merged) {
                return None;
            }
            let team_id = stories.next().map(|s| s.team_id.clone())?;
            let branch = r.feature_branch.clone().unwrap_or_else(|| r.target_branch.clone());
            Some((r.clone(), team_id, branch))
        })
        .collect();

    let mut triggered = 0usize;
    for (requirement, team_id, branch) in triggerable {
        let Some(team) = state.get_team(team_id.as_str()).cloned() else { continue };
        if !mark_sign_off(store, &requirement.id, now)? {
            continue;
        }

        match spawn_feature_test(store, ctx, config, clock, &team, &branch, &requirement, "").await {
            Ok(_agent_id) => triggered += 1,
            Err(err) => {
                revert_to_in_progress(store, &requirement.id, now)?;
                outcome.push_error(format!("feature_signoff: spawn failed for requirement {}: {err}", requirement.id));
            }
        }
    }

    let awaiting_verdict: Vec<(Requirement, TeamId, String)> = state
        .requirements
        .values()
        .filter(|r| r.status == RequirementStatus::SignOff)
        .filter_map(|r| {
            let team_id = state.stories_for_requirement(&r.id).next().map(|s| s.team_id.clone())?;
            let branch = r.feature_branch.clone().unwrap_or_else(|| r.target_branch.clone());
            Some((r.clone(), team_id, branch))
        })
        .collect();

    let mut passed = 0usize;
    let mut failed = 0usize;

    for (requirement, team_id, branch) in awaiting_verdict {
        let Some(agent) = latest_feature_test_agent(&state, &team_id) else { continue };
        let Some(session_name) = agent.session_name.clone() else { continue };

        let pane = match execute(ctx, &Effect::CapturePane { session_name: session_name.clone(), lines: CAPTURE_LINES }).await {
            Ok(result) => result.captured_pane.unwrap_or_default(),
            Err(err) => {
                outcome.push_error(format!("feature_signoff: capture_pane({session_name}) failed: {err}"));
                continue;
            }
        };

        let verdict = match parse_verdict(&pane) {
            Some(v) => v,
            None => continue,
        };

        match verdict {
            Verdict::Passed => {
                let merge_ok = match execute(
                    ctx,
                    &Effect::VcsMergeBranch { team_id: team_id.clone(), source_branch: branch.clone(), target_branch: "main".to_string() },
                )
                .await
                {
                    Ok(result) => result.external_failure.is_none(),
                    Err(err) => {
                        outcome.push_error(format!("feature_signoff: merge failed for requirement {}: {err}", requirement.id));
                        false
                    }
                };
                if !merge_ok {
                    continue;
                }
                mark_sign_off_result(store, &requirement.id, Verdict::Passed, now)?;
                passed += 1;
            }
            Verdict::Failed => {
                mark_sign_off_result(store, &requirement.id, Verdict::Failed, now)?;
                failed += 1;
            }
        }

        if let Err(err) = drain_and_kill(ctx, &agent, config.timing.spin_down_drain_ms).await {
            outcome.push_error(err);
        } else {
            terminate_agent(store, &agent, now)?;
        }
    }

    if triggered > 0 {
        outcome.push_line(format!("feature_signoff: triggered {triggered} sign-off run(s)"));
    }
    if passed > 0 {
        outcome.push_line(format!("feature_signoff: {passed} requirement(s) signed off"));
    }
    if failed > 0 {
        outcome.push_line(format!("feature_signoff: {failed} requirement(s) failed sign-off"));
    }
    Ok(outcome)
}

enum Verdict {
    Passed,
    Failed,
}

/// The last occurrence of either marker wins, so a retried run's final
/// report is what's read even if an earlier attempt's marker is still
/// visible higher up the pane.
fn parse_verdict(pane: &str) -> Option<Verdict> {
    let pass_at = pane.rfind(PASS_MARKER);
    let fail_at = pane.rfind(FAIL_MARKER);
    match (pass_at, fail_at) {
        (Some(p), Some(f)) => Some(if p > f { Verdict::Passed } else { Verdict::Failed }),
        (Some(_), None) => Some(Verdict::Passed),
        (None, Some(_)) => Some(Verdict::Failed),
        (None, None) => None,
    }
}

/// The single most recently spawned, still-alive `feature_test` agent for a
/// team. One concurrent sign-off per team is assumed — a later requirement
/// for the same team cannot reach `sign_off` until its stories all merge,
/// which serializes them in practice.
fn latest_feature_test_agent<'a>(state: &'a hive_storage::MaterializedState, team_id: &TeamId) -> Option<&'a Agent> {
    state
        .agents_for_team(team_id)
        .filter(|a| a.role == RoleType::FeatureTest && a.is_alive())
        .max_by_key(|a| a.created_at_ms)
}

async fn drain_and_kill(ctx: &EffectContext, agent: &Agent, drain_ms: u64) -> std::result::Result<(), String> {
    let Some(session_name) = agent.session_name.clone() else { return Ok(()) };
    tokio::time::sleep(Duration::from_millis(drain_ms)).await;
    execute(ctx, &Effect::KillSession { session_name: session_name.clone(), agent_id: agent.id.clone() })
        .await
        .map_err(|err| format!("feature_signoff kill({session_name}) failed: {err}"))?;
    Ok(())
}

fn terminate_agent(store: &Store, agent: &Agent, now: u64) -> Result<()> {
    let agent_id = agent.id.clone();
    store.with_transaction(|state| {
        if let Some(fresh) = state.get_agent(agent_id.as_str()) {
            let mut updated = fresh.clone();
            updated.status = hive_core::AgentStatus::Terminated;
            updated.updated_at_ms = now;
            state.upsert_agent(updated);
        }
        Ok(())
    })
}

fn mark_sign_off(store: &Store, requirement_id: &RequirementId, now: u64) -> Result<bool> {
    let requirement_id = requirement_id.clone();
    store.with_transaction(|state| {
        let Some(fresh) = state.get_requirement(requirement_id.as_str()) else { return Ok(false) };
        if fresh.status != RequirementStatus::InProgress {
            return Ok(false);
        }
        let mut updated = fresh.clone();
        updated.status = RequirementStatus::SignOff;
        updated.updated_at_ms = now;
        state.upsert_requirement(updated);
        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: None,
            story_id: None,
            event_type: EventType::FeatureSignOffTriggered,
            message: format!("requirement {requirement_id} entered sign-off"),
            metadata: BTreeMap::new(),
            created_at_ms: now,
        });
        Ok(true)
    })
}

fn revert_to_in_progress(store: &Store, requirement_id: &RequirementId, now: u64) -> Result<()> {
    let requirement_id = requirement_id.clone();
    store.with_transaction(|state| {
        if let Some(fresh) = state.get_requirement(requirement_id.as_str()) {
            if fresh.status != RequirementStatus::SignOff {
                return Ok(());
            }
            let mut updated = fresh.clone();
            updated.status = RequirementStatus::InProgress;
            updated.updated_at_ms = now;
            state.upsert_requirement(updated);
        }
        Ok(())
    })
}

fn mark_sign_off_result(store: &Store, requirement_id: &RequirementId, verdict: Verdict, now: u64) -> Result<()> {
    let requirement_id = requirement_id.clone();
    let (result, event_type) = match verdict {
        Verdict::Passed => (RequirementStatus::SignOffPassed, EventType::FeatureSignOffPassed),
        Verdict::Failed => (RequirementStatus::SignOffFailed, EventType::FeatureSignOffFailed),
    };
    store.with_transaction(|state| {
        let Some(fresh) = state.get_requirement(requirement_id.as_str()) else { return Ok(()) };
        if fresh.status != RequirementStatus::SignOff {
            return Ok(());
        }
        let mut updated = fresh.clone();
        updated.status = result;
        updated.updated_at_ms = now;
        state.upsert_requirement(updated);
        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: None,
            story_id: None,
            event_type,
            message: format!("requirement {requirement_id} sign-off resolved as {result}"),
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
    use hive_core::{AgentStatus, CliFlavor, FakeClock, Story, Team};
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
    async fn a_fully_merged_requirement_with_a_feature_branch_triggers_sign_off() {
        let (store, _dir) = test_store();
        let ctx = test_ctx();
        let config = HiveConfig::default();
        let clock = FakeClock::new();

        let team = Team::builder().build();
        let requirement = Requirement::builder().status(RequirementStatus::InProgress).feature_branch("integration/req-1".to_string()).build();
        let story = Story::builder().requirement_id(requirement.id.clone()).team_id(team.id.clone()).status(StoryStatus::Merged).build();

        store
            .with_transaction(|state| {
                state.upsert_team(team.clone());
                state.upsert_requirement(requirement.clone());
                state.upsert_story(story.clone());
                Ok(())
            })
            .unwrap();

        let outcome = run(&store, &ctx, &config, &clock).await.unwrap();
        assert!(outcome.lines.iter().any(|l| l.contains("triggered 1")));
        assert_eq!(store.read().get_requirement(requirement.id.as_str()).unwrap().status, RequirementStatus::SignOff);
    }

    #[tokio::test]
    async fn a_passing_verdict_merges_the_branch_and_marks_sign_off_passed() {
        let (store, _dir) = test_store();
        let ctx = test_ctx();
        let config = HiveConfig::default();
        let clock = FakeClock::new();

        let team = Team::builder().build();
        let requirement = Requirement::builder().status(RequirementStatus::SignOff).feature_branch("integration/req-1".to_string()).build();
        let story = Story::builder().requirement_id(requirement.id.clone()).team_id(team.id.clone()).status(StoryStatus::Merged).build();
        let agent = Agent::builder()
            .role(RoleType::FeatureTest)
            .team_id(team.id.clone())
            .cli_flavor(CliFlavor::Claude)
            .status(AgentStatus::Working)
            .session_name("hive-feature-test-backend".to_string())
            .build();

        ctx.sessions.create_session("hive-feature-test-backend", &std::path::PathBuf::from("/tmp"), &[]).await.unwrap();
        ctx.sessions.set_pane("hive-feature-test-backend", "running suite...\nE2E tests PASSED\n");

        store
            .with_transaction(|state| {
                state.upsert_team(team.clone());
                state.upsert_requirement(requirement.clone());
                state.upsert_story(story.clone());
                state.upsert_agent(agent.clone());
                Ok(())
            })
            .unwrap();

        let outcome = run(&store, &ctx, &config, &clock).await.unwrap();
        assert!(outcome.lines.iter().any(|l| l.contains("signed off")));
        let state = store.read();
        assert_eq!(state.get_requirement(requirement.id.as_str()).unwrap().status, RequirementStatus::SignOffPassed);
        assert_eq!(state.get_agent(agent.id.as_str()).unwrap().status, AgentStatus::Terminated);
    }

    #[tokio::test]
    async fn a_failing_verdict_marks_sign_off_failed_without_merging() {
        let (store, _dir) = test_store();
        let ctx = test_ctx();
        let config = HiveConfig::default();
        let clock = FakeClock::new();

        let team = Team::builder().build();
        let requirement = Requirement::builder().status(RequirementStatus::SignOff).feature_branch("integration/req-1".to_string()).build();
        let story = Story::builder().requirement_id(requirement.id.clone()).team_id(team.id.clone()).status(StoryStatus::Merged).build();
        let agent = Agent::builder()
            .role(RoleType::FeatureTest)
            .team_id(team.id.clone())
            .cli_flavor(CliFlavor::Claude)
            .status(AgentStatus::Working)
            .session_name("hive-feature-test-backend".to_string())
            .build();

        ctx.sessions.create_session("hive-feature-test-backend", &std::path::PathBuf::from("/tmp"), &[]).await.unwrap();
        ctx.sessions.set_pane("hive-feature-test-backend", "running suite...\nE2E tests FAILED\n");

        store
            .with_transaction(|state| {
                state.upsert_team(team.clone());
                state.upsert_requirement(requirement.clone());
                state.upsert_story(story.clone());
                state.upsert_agent(agent.clone());
                Ok(())
            })
            .unwrap();

        let outcome = run(&store, &ctx, &config, &clock).await.unwrap();
        assert!(outcome.lines.iter().any(|l| l.contains("failed sign-off")));
        assert_eq!(store.read().get_requirement(requirement.id.as_str()).unwrap().status, RequirementStatus::SignOffFailed);
    }
}
