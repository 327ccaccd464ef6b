// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Approved-PR auto-merge (spec.md §4.3.5) and orphaned-reviewer recovery
//! (spec.md §4.3.6) — the two checks that keep the per-team merge queue
//! moving.

use std::collections::{BTreeMap, HashSet};

use hive_core::{
    Clock, Effect, EventType, HiveConfig, LogEntry, LogEntryId, PrStatus, PullRequest,
    PullRequestId, StoryId, StoryStatus,
};
use hive_engine::{execute, EffectContext};
use hive_storage::Store;

use crate::checks::CheckOutcome;
use crate::error::Result;

pub async fn run(store: &Store, ctx: &EffectContext, _config: &HiveConfig, clock: &impl Clock) -> Result<CheckOutcome> {
    let now = clock.epoch_ms();
    let state = store.read();
    let mut outcome = CheckOutcome::empty();

    let approved: Vec<PullRequest> =
        state.pull_requests.values().filter(|pr| pr.status == PrStatus::Approved && pr.external_number.is_some()).cloned().collect();

    let mut merged = 0usize;
    let mut retry_later = 0usize;

    for pr in approved {
        let Some(external_number) = pr.external_number else { continue };
        let merge_ok = match execute(
            ctx,
            &Effect::VcsMergePr { pr_id: pr.id, external_number, squash: true, delete_branch: true },
        )
        .await
        {
            Ok(result) => result.external_failure.is_none(),
            Err(err) => {
                outcome.push_error(format!("merge_queue: vcs dispatch failed for pr {}: {err}", pr.id));
                false
            }
        };

        if !merge_ok {
            tracing::warn!(pr_id = %pr.id, "merge_queue: merge failed, leaving pr approved for a later retry");
            retry_later += 1;
            continue;
        }

        let issue_key = commit_merge(store, &pr.id, &pr.story_id, now)?;
        merged += 1;

        if let Some(issue_key) = issue_key {
            if let Err(err) = ctx.pm.transition_story(&issue_key, "Merged").await {
                outcome.push_error(format!("merge_queue: pm push for story {} failed: {err}", pr.story_id));
            }
        }
    }

    let live_sessions: HashSet<String> = ctx
        .sessions
        .list_hive_sessions()
        .await
        .map(|sessions| sessions.into_iter().map(|s| s.name).collect())
        .unwrap_or_default();

    let reviewing: Vec<PullRequest> = state.pull_requests.values().filter(|pr| pr.status == PrStatus::Reviewing).cloned().collect();
    let mut recovered = 0usize;

    for pr in reviewing {
        let orphaned = match &pr.reviewer_agent_id {
            None => true,
            Some(reviewer_id) => match state.get_agent(reviewer_id.as_str()) {
                None => true,
                Some(agent) => {
                    !agent.is_alive() || agent.session_name.as_deref().map(|s| !live_sessions.contains(s)).unwrap_or(true)
                }
            },
        };
        if !orphaned {
            continue;
        }
        reset_pr_to_queued(store, &pr.id, now)?;
        recovered += 1;
    }

    if merged > 0 {
        outcome.push_line(format!("merge_queue: merged {merged} approved pr(s)"));
    }
    if retry_later > 0 {
        outcome.push_line(format!("merge_queue: left {retry_later} approved pr(s) for retry"));
    }
    if recovered > 0 {
        outcome.push_line(format!("merge_queue: reset {recovered} orphaned reviewer pr(s) to queued"));
    }
    Ok(outcome)
}

fn commit_merge(store: &Store, pr_id: &PullRequestId, story_id: &StoryId, now: u64) -> Result<Option<String>> {
    let pr_id = pr_id.clone();
    let story_id = story_id.clone();
    let issue_key = store.with_transaction(|state| {
        let Some(fresh_pr) = state.get_pull_request(pr_id.as_str()) else { return Ok(None) };
        if fresh_pr.status != PrStatus::Approved {
            return Ok(None);
        }
        let mut updated_pr = fresh_pr.clone();
        updated_pr.status = PrStatus::Merged;
        updated_pr.updated_at_ms = now;
        state.upsert_pull_request(updated_pr);

        let mut issue_key = None;
        if let Some(story) = state.get_story(story_id.as_str()) {
            issue_key = story.pm_keys.issue_key.clone();
            let mut updated_story = story.clone();
            updated_story.status = StoryStatus::Merged;
            updated_story.updated_at_ms = now;
            state.upsert_story(updated_story);
        }

        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: None,
            story_id: Some(story_id.clone()),
            event_type: EventType::PrMerged,
            message: format!("pr {pr_id} merged"),
            metadata: BTreeMap::new(),
            created_at_ms: now,
        });
        Ok(issue_key)
    })?;
    Ok(issue_key)
}

fn reset_pr_to_queued(store: &Store, pr_id: &PullRequestId, now: u64) -> Result<()> {
    let pr_id = pr_id.clone();
    store.with_transaction(|state| {
        if let Some(fresh) = state.get_pull_request(pr_id.as_str()) {
            if fresh.status != PrStatus::Reviewing {
                return Ok(());
            }
            let mut updated = fresh.clone();
            updated.status = PrStatus::Queued;
            updated.reviewer_agent_id = None;
            updated.updated_at_ms = now;
            state.upsert_pull_request(updated);
        }
        Ok(())
    })
}
