// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler (spec.md §4.2): turns `planned` stories into work on live
//! agents and grows the worker pool as the queue demands. Invoked both by
//! `hive assign` and, every tick, by the Manager Daemon.

use std::collections::BTreeMap;

use hive_core::{
    Agent, AgentId, AgentStatus, CliFlavor, Clock, Effect, EventType, HiveConfig, LogEntry,
    LogEntryId, Requirement, RoleType, Story, StoryStatus, Team,
};
use hive_storage::Store;

use crate::effects::{execute, EffectContext};
use crate::error::Result;
use crate::spawn::{spawn_agent, SpawnRequest};

/// Result of one `assignStories()` pass.
#[derive(Debug, Clone, Default)]
pub struct AssignmentReport {
    pub assigned: usize,
    pub prevented_duplicates: usize,
    pub errors: Vec<String>,
}

/// For each `planned` story whose dependencies are all `merged`, pick the
/// most appropriate live worker on its team and transition the story to
/// `in_progress`. Spawns a worker first when none is eligible and capacity
/// permits. Idempotent under retry: the CAS update that claims a story
/// counts a lost race as `preventedDuplicates` rather than erroring.
pub async fn assign_stories(
    store: &Store,
    ctx: &EffectContext,
    config: &HiveConfig,
    clock: &impl Clock,
) -> Result<AssignmentReport> {
    let mut report = AssignmentReport::default();
    let snapshot = store.read();

    let mut eligible: Vec<Story> = snapshot
        .stories
        .values()
        .filter(|s| s.status == StoryStatus::Planned && s.assigned_agent_id.is_none())
        .filter(|s| {
            s.dependencies_satisfied(|dep| {
                snapshot.get_story(dep.as_str()).map(|d| d.status == StoryStatus::Merged).unwrap_or(false)
            })
        })
        .cloned()
        .collect();
    eligible.sort_by_key(|s| s.created_at_ms);

    // Agents spawned earlier in this pass, invisible to `snapshot` (read once
    // above). Merged into each story's candidate pool so a cap check later
    // in the same pass sees a worker spawned by an earlier story.
    let mut spawned_this_pass: Vec<Agent> = Vec::new();

    for story in eligible {
        let Some(team) = snapshot.get_team(story.team_id.as_str()).cloned() else {
            report.errors.push(format!("story {}: team {} no longer exists", story.id, story.team_id));
            continue;
        };
        let target_role = RoleType::for_complexity(story.complexity);
        let mut team_agents: Vec<Agent> = snapshot.agents_for_team(&team.id).cloned().collect();
        team_agents.extend(spawned_this_pass.iter().filter(|a| a.team_id.as_ref() == Some(&team.id)).cloned());

        let agent_id = match pick_candidate(&team_agents, target_role, &team) {
            Some(id) => id,
            None => {
                let alive_of_role =
                    team_agents.iter().filter(|a| a.is_alive() && a.role == target_role).count() as u32;
                let cap = team.max_for(target_role).unwrap_or(u32::MAX);
                if alive_of_role >= cap {
                    report.errors.push(format!(
                        "story {}: no eligible {target_role} worker on team {} and the role is at cap",
                        story.id, team.display_name
                    ));
                    continue;
                }
                let spawn_req = SpawnRequest {
                    role: target_role,
                    team: Some(&team),
                    cli_flavor: CliFlavor::Claude,
                    target_branch: "main",
                    progress_updates_enabled: true,
                };
                match spawn_agent(store, ctx, config, clock, spawn_req).await {
                    Ok(id) => {
                        if let Some(agent) = store.read().get_agent(id.as_str()) {
                            spawned_this_pass.push(agent.clone());
                        }
                        id
                    }
                    Err(err) => {
                        report.errors.push(format!("story {}: spawn failed: {err}", story.id));
                        continue;
                    }
                }
            }
        };

        let now = clock.epoch_ms();
        let story_id = story.id.clone();
        let claimed = store.with_transaction(|state| {
            let Some(fresh) = state.get_story(story_id.as_str()) else { return Ok(false) };
            if fresh.status != StoryStatus::Planned || fresh.assigned_agent_id.is_some() {
                return Ok(false);
            }
            let mut updated = fresh.clone();
            updated.status = StoryStatus::InProgress;
            updated.assigned_agent_id = Some(agent_id.clone());
            updated.updated_at_ms = now;
            state.upsert_story(updated);

            if let Some(agent) = state.get_agent(agent_id.as_str()) {
                let mut updated_agent = agent.clone();
                updated_agent.current_story_id = Some(story_id.clone());
                updated_agent.status = AgentStatus::Working;
                updated_agent.last_seen_ms = now;
                updated_agent.updated_at_ms = now;
                state.upsert_agent(updated_agent);
            }

            state.append_log_entry(LogEntry {
                id: LogEntryId::new(),
                agent_id: Some(agent_id.clone()),
                story_id: Some(story_id.clone()),
                event_type: EventType::StoryAssigned,
                message: format!("assigned to {agent_id}"),
                metadata: BTreeMap::new(),
                created_at_ms: now,
            });
            Ok(true)
        })?;

        if claimed {
            report.assigned += 1;
        } else {
            report.prevented_duplicates += 1;
        }
    }

    Ok(report)
}

/// Among a team's live junior/intermediate/senior agents, pick the one
/// `assignStories` should hand `story_id` to: same role as `target_role`
/// first, falling back to a higher (absorbing) role only when `target_role`
/// is at its team cap. Prefers `idle` over `working`, then oldest
/// `last_seen_ms` for round-robin fairness.
fn pick_candidate(agents: &[Agent], target_role: RoleType, team: &Team) -> Option<AgentId> {
    let alive_of_role =
        agents.iter().filter(|a| a.is_alive() && a.role == target_role).count() as u32;
    let at_cap = team.max_for(target_role).map(|cap| alive_of_role >= cap).unwrap_or(false);

    let mut candidates: Vec<&Agent> = agents
        .iter()
        .filter(|a| {
            matches!(a.status, AgentStatus::Idle | AgentStatus::Working)
                && matches!(a.role, RoleType::Junior | RoleType::Intermediate | RoleType::Senior)
                && (a.role == target_role || (at_cap && a.role.may_absorb(target_role)))
        })
        .collect();

    candidates.sort_by_key(|a| (a.status != AgentStatus::Idle, a.last_seen_ms));
    candidates.first().map(|a| a.id.clone())
}

/// For each team with unassigned `planned` work, ensure at least one
/// `senior` is alive (a senior may absorb any complexity) and, for each role
/// the backlog actually needs, at least one live worker of that role up to
/// the team's caps. Returns how many agents were spawned.
pub async fn check_scaling(
    store: &Store,
    ctx: &EffectContext,
    config: &HiveConfig,
    clock: &impl Clock,
) -> Result<usize> {
    let mut spawned = 0usize;
    let snapshot = store.read();

    for team in snapshot.teams.values() {
        let unassigned: Vec<&Story> = snapshot
            .stories_for_team(&team.id)
            .filter(|s| s.status == StoryStatus::Planned && s.assigned_agent_id.is_none())
            .collect();
        if unassigned.is_empty() {
            continue;
        }
        let team_agents: Vec<&Agent> = snapshot.agents_for_team(&team.id).collect();

        let needed_roles: Vec<RoleType> = [RoleType::Junior, RoleType::Intermediate, RoleType::Senior]
            .into_iter()
            .filter(|role| {
                *role == RoleType::Senior
                    || unassigned.iter().any(|s| RoleType::for_complexity(s.complexity) == *role)
            })
            .collect();

        for role in needed_roles {
            let alive_count = team_agents.iter().filter(|a| a.is_alive() && a.role == role).count() as u32;
            if alive_count > 0 {
                continue;
            }
            let cap = team.max_for(role).unwrap_or(0);
            if cap == 0 {
                continue;
            }
            let spawn_req = SpawnRequest {
                role,
                team: Some(team),
                cli_flavor: CliFlavor::Claude,
                target_branch: "main",
                progress_updates_enabled: true,
            };
            match spawn_agent(store, ctx, config, clock, spawn_req).await {
                Ok(_) => spawned += 1,
                Err(err) => {
                    tracing::warn!(team = %team.display_name, %role, error = %err, "checkScaling: failed to spawn worker");
                }
            }
        }
    }

    Ok(spawned)
}

/// Ensure at least one live `qa` agent exists per team that has `queued` or
/// `reviewing` pull requests. Returns how many agents were spawned.
pub async fn check_merge_queue(
    store: &Store,
    ctx: &EffectContext,
    config: &HiveConfig,
    clock: &impl Clock,
) -> Result<usize> {
    let mut spawned = 0usize;
    let snapshot = store.read();

    for team in snapshot.teams.values() {
        if snapshot.open_pull_requests_for_team(&team.id).next().is_none() {
            continue;
        }
        let alive_qa = snapshot.agents_for_team(&team.id).any(|a| a.is_alive() && a.role == RoleType::Qa);
        if alive_qa {
            continue;
        }
        let spawn_req = SpawnRequest {
            role: RoleType::Qa,
            team: Some(team),
            cli_flavor: CliFlavor::Claude,
            target_branch: "main",
            progress_updates_enabled: true,
        };
        match spawn_agent(store, ctx, config, clock, spawn_req).await {
            Ok(_) => spawned += 1,
            Err(err) => {
                tracing::warn!(team = %team.display_name, error = %err, "checkMergeQueue: failed to spawn qa");
            }
        }
    }

    Ok(spawned)
}

/// Create a one-shot `feature_test` agent to drive end-to-end tests against
/// `branch`. `e2e_tests_path` is delivered as a follow-up message once the
/// session is up, rather than templated into the first prompt, so it can be
/// blank for teams that haven't configured one.
pub async fn spawn_feature_test(
    store: &Store,
    ctx: &EffectContext,
    config: &HiveConfig,
    clock: &impl Clock,
    team: &Team,
    branch: &str,
    requirement: &Requirement,
    e2e_tests_path: &str,
) -> Result<AgentId> {
    let spawn_req = SpawnRequest {
        role: RoleType::FeatureTest,
        team: Some(team),
        cli_flavor: CliFlavor::Claude,
        target_branch: branch,
        progress_updates_enabled: false,
    };
    let agent_id = spawn_agent(store, ctx, config, clock, spawn_req).await?;

    if !e2e_tests_path.is_empty() {
        let session_name = store.read().get_agent(agent_id.as_str()).and_then(|a| a.session_name.clone());
        if let Some(session_name) = session_name {
            let _ = execute(
                ctx,
                &Effect::SendSessionMessage {
                    session_name,
                    text: format!("End-to-end test suite path: {e2e_tests_path}"),
                },
            )
            .await;
        }
    }

    let now = clock.epoch_ms();
    store.with_transaction(|state| {
        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: Some(agent_id.clone()),
            story_id: None,
            event_type: EventType::FeatureTestSpawned,
            message: format!("feature test spawned for requirement {} on branch {branch}", requirement.id),
            metadata: BTreeMap::new(),
            created_at_ms: now,
        });
        Ok(())
    })?;

    Ok(agent_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_adapters::connectors::{FakePmConnector, FakeVcsConnector};
    use hive_adapters::FakeSessionAdapter;
    use hive_core::{Agent, FakeClock, Requirement, Story, Team};
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

    #[yare::parameterized(
        junior = { 2, RoleType::Junior },
        intermediate = { 4, RoleType::Intermediate },
        senior = { 9, RoleType::Senior },
    )]
    fn role_routing_table(complexity: u8, expected: RoleType) {
        assert_eq!(RoleType::for_complexity(complexity), expected);
    }

    #[tokio::test]
    async fn assign_stories_spawns_a_worker_and_claims_the_story() {
        let (store, _dir) = test_store();
        let ctx = test_ctx();
        let config = HiveConfig::default();
        let clock = FakeClock::new();

        let team = Team::builder().build();
        let story = Story::builder().team_id(team.id.clone()).complexity(2).status(StoryStatus::Planned).build();
        store
            .with_transaction(|state| {
                state.upsert_team(team.clone());
                state.upsert_story(story.clone());
                Ok(())
            })
            .unwrap();

        let report = assign_stories(&store, &ctx, &config, &clock).await.unwrap();
        assert_eq!(report.assigned, 1);
        assert!(report.errors.is_empty());

        let state = store.read();
        let updated = state.get_story(story.id.as_str()).unwrap();
        assert_eq!(updated.status, StoryStatus::InProgress);
        assert!(updated.assigned_agent_id.is_some());
        let agent = state.get_agent(updated.assigned_agent_id.as_ref().unwrap().as_str()).unwrap();
        assert_eq!(agent.role, RoleType::Junior);
    }

    #[tokio::test]
    async fn assign_stories_skips_stories_with_unmerged_dependencies() {
        let (store, _dir) = test_store();
        let ctx = test_ctx();
        let config = HiveConfig::default();
        let clock = FakeClock::new();

        let team = Team::builder().build();
        let blocker = Story::builder().team_id(team.id.clone()).status(StoryStatus::InProgress).build();
        let mut story = Story::builder().team_id(team.id.clone()).status(StoryStatus::Planned).build();
        story.add_dependency(blocker.id.clone());

        store
            .with_transaction(|state| {
                state.upsert_team(team.clone());
                state.upsert_story(blocker.clone());
                state.upsert_story(story.clone());
                Ok(())
            })
            .unwrap();

        let report = assign_stories(&store, &ctx, &config, &clock).await.unwrap();
        assert_eq!(report.assigned, 0);

        let state = store.read();
        assert_eq!(state.get_story(story.id.as_str()).unwrap().status, StoryStatus::Planned);
    }

    #[tokio::test]
    async fn assign_stories_is_idempotent_over_an_already_assigned_story() {
        let (store, _dir) = test_store();
        let ctx = test_ctx();
        let config = HiveConfig::default();
        let clock = FakeClock::new();

        let team = Team::builder().build();
        let story = Story::builder().team_id(team.id.clone()).complexity(2).status(StoryStatus::Planned).build();
        store
            .with_transaction(|state| {
                state.upsert_team(team.clone());
                state.upsert_story(story.clone());
                Ok(())
            })
            .unwrap();

        assign_stories(&store, &ctx, &config, &clock).await.unwrap();
        let second = assign_stories(&store, &ctx, &config, &clock).await.unwrap();
        assert_eq!(second.assigned, 0);
        assert_eq!(second.prevented_duplicates, 0);
    }

    #[tokio::test]
    async fn assign_stories_prefers_idle_worker_over_working_one() {
        let (store, _dir) = test_store();
        let ctx = test_ctx();
        let config = HiveConfig::default();
        let clock = FakeClock::new();

        let team = Team::builder().junior_max(2).build();
        let working = Agent::builder().role(RoleType::Junior).team_id(team.id.clone()).status(AgentStatus::Working).last_seen_ms(10).build();
        let idle = Agent::builder().role(RoleType::Junior).team_id(team.id.clone()).status(AgentStatus::Idle).last_seen_ms(20).build();
        let story = Story::builder().team_id(team.id.clone()).complexity(2).status(StoryStatus::Planned).build();

        store
            .with_transaction(|state| {
                state.upsert_team(team.clone());
                state.upsert_agent(working.clone());
                state.upsert_agent(idle.clone());
                state.upsert_story(story.clone());
                Ok(())
            })
            .unwrap();

        let report = assign_stories(&store, &ctx, &config, &clock).await.unwrap();
        assert_eq!(report.assigned, 1);
        let state = store.read();
        let updated = state.get_story(story.id.as_str()).unwrap();
        assert_eq!(updated.assigned_agent_id.as_ref().unwrap(), &idle.id);
    }

    #[tokio::test]
    async fn assign_stories_a_busy_worker_of_the_target_role_still_absorbs_the_story() {
        let (store, _dir) = test_store();
        let ctx = test_ctx();
        let config = HiveConfig::default();
        let clock = FakeClock::new();

        let team = Team::builder().junior_max(1).build();
        let busy = Agent::builder().role(RoleType::Junior).team_id(team.id.clone()).status(AgentStatus::Working).build();
        let story = Story::builder().team_id(team.id.clone()).complexity(2).status(StoryStatus::Planned).build();

        store
            .with_transaction(|state| {
                state.upsert_team(team.clone());
                state.upsert_agent(busy.clone());
                state.upsert_story(story.clone());
                Ok(())
            })
            .unwrap();

        let report = assign_stories(&store, &ctx, &config, &clock).await.unwrap();
        assert_eq!(report.assigned, 1, "the sole junior, though busy, absorbs the story");
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn assign_stories_records_one_error_and_moves_on_when_role_is_at_cap() {
        let (store, _dir) = test_store();
        let ctx = test_ctx();
        let config = HiveConfig::default();
        let clock = FakeClock::new();

        let team = Team::builder().junior_max(0).build();
        let story = Story::builder().team_id(team.id.clone()).complexity(2).status(StoryStatus::Planned).build();

        store
            .with_transaction(|state| {
                state.upsert_team(team.clone());
                state.upsert_story(story.clone());
                Ok(())
            })
            .unwrap();

        let report = assign_stories(&store, &ctx, &config, &clock).await.unwrap();
        assert_eq!(report.assigned, 0);
        assert_eq!(report.errors.len(), 1);

        let state = store.read();
        assert_eq!(state.get_story(story.id.as_str()).unwrap().status, StoryStatus::Planned);
    }

    #[tokio::test]
    async fn check_merge_queue_spawns_qa_when_a_pr_is_queued_and_none_is_alive() {
        let (store, _dir) = test_store();
        let ctx = test_ctx();
        let config = HiveConfig::default();
        let clock = FakeClock::new();

        let team = Team::builder().build();
        let pr = hive_core::PullRequest::builder().team_id(team.id.clone()).build();
        store
            .with_transaction(|state| {
                state.upsert_team(team.clone());
                state.upsert_pull_request(pr);
                Ok(())
            })
            .unwrap();

        let spawned = check_merge_queue(&store, &ctx, &config, &clock).await.unwrap();
        assert_eq!(spawned, 1);
        let state = store.read();
        assert!(state.agents_for_team(&team.id).any(|a| a.role == RoleType::Qa));
    }

    #[tokio::test]
    async fn spawn_feature_test_creates_a_one_shot_agent() {
        let (store, _dir) = test_store();
        let ctx = test_ctx();
        let config = HiveConfig::default();
        let clock = FakeClock::new();
        let team = Team::builder().build();
        let requirement = Requirement::builder().build();

        let agent_id =
            spawn_feature_test(&store, &ctx, &config, &clock, &team, "integration/req-1", &requirement, "tests/e2e")
                .await
                .unwrap();

        let state = store.read();
        let agent = state.get_agent(agent_id.as_str()).unwrap();
        assert_eq!(agent.role, RoleType::FeatureTest);
        assert_eq!(
            state.log_entries.values().filter(|l| l.event_type == EventType::FeatureTestSpawned).count(),
            1
        );
    }
}
