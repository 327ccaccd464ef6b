// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bidirectional PM sync (spec.md §4.6). The tick loop gates how often this
//! runs (`long_poll_every_n_ticks`); this module just does one pass's worth
//! of work each time it's called.
//!
//! Five steps per pass: push unlinked stories to the provider, repair
//! missing subtasks, retry sprint assignment, pull external status forward
//! onto local stories, and push local status changes the provider hasn't
//! caught up to yet. Every PM call goes directly through [`PmConnector`]
//! rather than the generic `Effect` dispatcher, since each call needs the
//! full story context the dispatcher's `Effect::Pm*` variants deliberately
//! don't carry.

use hive_core::{Clock, EventType, HiveConfig, LogEntry, LogEntryId, Story, StoryId, StoryStatus};
use hive_engine::EffectContext;
use hive_storage::Store;

use crate::checks::CheckOutcome;
use crate::error::Result;

pub async fn run(store: &Store, ctx: &EffectContext, _config: &HiveConfig, clock: &impl Clock) -> Result<CheckOutcome> {
    let now = clock.epoch_ms();
    let state = store.read();
    let mut outcome = CheckOutcome::empty();

    let pushable: Vec<Story> = state.stories.values().filter(|s| s.pm_keys.issue_key.is_none()).cloned().collect();
    let mut pushed = 0usize;
    for story in pushable {
        let Some(requirement) = state.get_requirement(story.requirement_id.as_str()) else { continue };
        let epic_key = requirement.external_epic_key.clone().unwrap_or_default();
        match ctx.pm.create_story("", &epic_key, &story.title, &story.description).await {
            Ok(issue) => {
                set_issue_key(store, &story.id, issue.key, now)?;
                pushed += 1;
            }
            Err(err) => outcome.push_error(format!("pm_sync: push story {} failed: {err}", story.id)),
        }
    }

    let needing_subtask: Vec<Story> = state
        .stories
        .values()
        .filter(|s| s.assigned_agent_id.is_some() && s.pm_keys.issue_key.is_some() && s.pm_keys.subtask_key.is_none())
        .cloned()
        .collect();
    let mut subtasks_created = 0usize;
    for story in needing_subtask {
        let parent_key = story.pm_keys.issue_key.clone().unwrap_or_default();
        match ctx.pm.create_subtask(&parent_key, &format!("Work: {}", story.title)).await {
            Ok(subtask) => {
                set_subtask_key(store, &story.id, subtask.key, now)?;
                subtasks_created += 1;
            }
            Err(err) => outcome.push_error(format!("pm_sync: subtask repair for story {} failed: {err}", story.id)),
        }
    }

    let needing_sprint: Vec<Story> = state
        .stories
        .values()
        .filter(|s| !s.in_sprint && s.pm_keys.issue_key.is_some() && s.pm_keys.subtask_key.is_some())
        .cloned()
        .collect();
    let mut sprinted = 0usize;
    for story in needing_sprint {
        let issue_key = story.pm_keys.issue_key.clone().unwrap_or_default();
        if let Err(err) = ctx.pm.post_comment(&issue_key, "sprint_assignment", "retrying sprint assignment").await {
            outcome.push_error(format!("pm_sync: sprint retry for story {} failed: {err}", story.id));
            continue;
        }
        mark_in_sprint(store, &story.id, now)?;
        sprinted += 1;
    }

    let linked: Vec<Story> = state.stories.values().filter(|s| s.pm_keys.issue_key.is_some()).cloned().collect();
    let mut pulled = 0usize;
    let mut repushed = 0usize;
    for story in linked {
        let issue_key = story.pm_keys.issue_key.clone().unwrap_or_default();
        let external = match ctx.pm.get_issue(&issue_key).await {
            Ok(issue) => issue,
            Err(err) => {
                outcome.push_error(format!("pm_sync: get_issue({issue_key}) failed: {err}"));
                continue;
            }
        };

        let Some(external_status) = story_status_from_provider(&external.status) else {
            tracing::warn!(issue_key = %issue_key, provider_status = %external.status, "pm_sync: unmapped provider status, skipping");
            continue;
        };

        if external_status.order() > story.status.order() {
            apply_external_status(store, &story.id, external_status, now)?;
            pulled += 1;
        } else if story.status.order() > external_status.order() {
            if let Err(err) = ctx.pm.transition_story(&issue_key, &story.status.to_string()).await {
                outcome.push_error(format!("pm_sync: push status for story {} failed: {err}", story.id));
                continue;
            }
            repushed += 1;
        }
    }

    if pushed > 0 {
        outcome.push_line(format!("pm_sync: pushed {pushed} new story/stories to the provider"));
    }
    if subtasks_created > 0 {
        outcome.push_line(format!("pm_sync: repaired {subtasks_created} missing subtask(s)"));
    }
    if sprinted > 0 {
        outcome.push_line(format!("pm_sync: retried sprint assignment for {sprinted} stor{}", if sprinted == 1 { "y" } else { "ies" }));
    }
    if pulled > 0 {
        outcome.push_line(format!("pm_sync: pulled forward status for {pulled} stor{}", if pulled == 1 { "y" } else { "ies" }));
    }
    if repushed > 0 {
        outcome.push_line(format!("pm_sync: pushed local status ahead for {repushed} stor{}", if repushed == 1 { "y" } else { "ies" }));
    }
    Ok(outcome)
}

/// Provider status strings are modeled as the hive status's own snake_case
/// form; a configured provider's real status vocabulary would sit behind
/// its own adapter-level mapping rather than being inverted from a
/// comparison of the hive status's Display output.
fn story_status_from_provider(status: &str) -> Option<StoryStatus> {
    match status {
        "draft" => Some(StoryStatus::Draft),
        "estimated" => Some(StoryStatus::Estimated),
        "planned" => Some(StoryStatus::Planned),
        "in_progress" => Some(StoryStatus::InProgress),
        "review" => Some(StoryStatus::Review),
        "qa_failed" => Some(StoryStatus::QaFailed),
        "pr_submitted" => Some(StoryStatus::PrSubmitted),
        "qa" => Some(StoryStatus::Qa),
        "merged" => Some(StoryStatus::Merged),
        _ => None,
    }
}

fn set_issue_key(store: &Store, story_id: &StoryId, issue_key: String, now: u64) -> Result<()> {
    let story_id = story_id.clone();
    store.with_transaction(|state| {
        if let Some(story) = state.get_story(story_id.as_str()) {
            let mut updated = story.clone();
            updated.pm_keys.issue_key = Some(issue_key);
            updated.updated_at_ms = now;
            state.upsert_story(updated);
        }
        Ok(())
    })
}

fn set_subtask_key(store: &Store, story_id: &StoryId, subtask_key: String, now: u64) -> Result<()> {
    let story_id = story_id.clone();
    store.with_transaction(|state| {
        if let Some(story) = state.get_story(story_id.as_str()) {
            let mut updated = story.clone();
            updated.pm_keys.subtask_key = Some(subtask_key);
            updated.updated_at_ms = now;
            state.upsert_story(updated);
        }
        Ok(())
    })
}

fn mark_in_sprint(store: &Store, story_id: &StoryId, now: u64) -> Result<()> {
    let story_id = story_id.clone();
    store.with_transaction(|state| {
        if let Some(story) = state.get_story(story_id.as_str()) {
            let mut updated = story.clone();
            updated.in_sprint = true;
            updated.updated_at_ms = now;
            state.upsert_story(updated);
        }
        Ok(())
    })
}

fn apply_external_status(store: &Store, story_id: &StoryId, new_status: StoryStatus, now: u64) -> Result<()> {
    let story_id = story_id.clone();
    store.with_transaction(|state| {
        let Some(fresh) = state.get_story(story_id.as_str()) else { return Ok(()) };
        if new_status.order() <= fresh.status.order() {
            return Ok(());
        }
        let mut updated = fresh.clone();
        updated.status = new_status;
        updated.updated_at_ms = now;
        state.upsert_story(updated);
        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: None,
            story_id: Some(story_id.clone()),
            event_type: EventType::JiraSyncCompleted,
            message: format!("story {story_id} advanced to {new_status} from provider status"),
            metadata: Default::default(),
            created_at_ms: now,
        });
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_adapters::connectors::{ExternalIssue, FakePmConnector, FakeVcsConnector};
    use hive_adapters::FakeSessionAdapter;
    use hive_core::{FakeClock, Requirement, Team};
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
    async fn an_unlinked_story_is_pushed_to_the_provider() {
        let (store, _dir) = test_store();
        let ctx = test_ctx();
        let config = HiveConfig::default();
        let clock = FakeClock::new();

        let team = Team::builder().build();
        let requirement = Requirement::builder().build();
        let story = Story::builder().team_id(team.id.clone()).requirement_id(requirement.id.clone()).build();

        store
            .with_transaction(|state| {
                state.upsert_team(team.clone());
                state.upsert_requirement(requirement.clone());
                state.upsert_story(story.clone());
                Ok(())
            })
            .unwrap();

        let outcome = run(&store, &ctx, &config, &clock).await.unwrap();
        assert!(outcome.lines.iter().any(|l| l.contains("pushed 1")));
        assert!(store.read().get_story(story.id.as_str()).unwrap().pm_keys.issue_key.is_some());
    }

    #[tokio::test]
    async fn a_forward_provider_status_advances_the_local_story() {
        let (store, _dir) = test_store();
        let pm = Arc::new(FakePmConnector::new());
        let ctx = EffectContext {
            sessions: Arc::new(FakeSessionAdapter::new()),
            vcs: Arc::new(FakeVcsConnector::new()),
            pm: pm.clone(),
        };
        let config = HiveConfig::default();
        let clock = FakeClock::new();

        let team = Team::builder().build();
        let requirement = Requirement::builder().build();
        let issue: ExternalIssue = pm.create_story("", "EPIC-1", "x", "y").await.unwrap();
        let mut story = Story::builder().team_id(team.id.clone()).requirement_id(requirement.id.clone()).status(StoryStatus::InProgress).build();
        story.pm_keys.issue_key = Some(issue.key.clone());

        store
            .with_transaction(|state| {
                state.upsert_team(team.clone());
                state.upsert_requirement(requirement.clone());
                state.upsert_story(story.clone());
                Ok(())
            })
            .unwrap();

        pm.transition_story(&issue.key, "review").await.unwrap();
        let outcome = run(&store, &ctx, &config, &clock).await.unwrap();
        assert!(outcome.lines.iter().any(|l| l.contains("pulled forward")));
        assert_eq!(store.read().get_story(story.id.as_str()).unwrap().status, StoryStatus::Review);
    }
}
