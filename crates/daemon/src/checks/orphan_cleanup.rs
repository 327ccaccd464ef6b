// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orphan-resource cleanup (spec.md §4.3.8): four independent categories of
//! stale resource, each scanned and reported separately. The tick loop only
//! ever reports — actual removal requires the explicit confirmation the CLI
//! `cleanup` command gathers from whoever runs it (spec.md §6).

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use hive_core::{Clock, HiveConfig, StoryId};
use hive_engine::EffectContext;
use hive_storage::Store;

use crate::checks::CheckOutcome;
use crate::config::DaemonConfig;
use crate::error::Result;

/// One pass's findings, independent per category so a caller can act on any
/// subset (the CLI's `--worktrees --locks --sessions --assignments` flags).
#[derive(Debug, Clone, Default)]
pub struct OrphanReport {
    pub orphaned_worktrees: Vec<PathBuf>,
    pub stale_locks: Vec<PathBuf>,
    pub orphaned_sessions: Vec<String>,
    pub dangling_assignments: Vec<StoryId>,
}

impl OrphanReport {
    pub fn is_empty(&self) -> bool {
        self.orphaned_worktrees.is_empty()
            && self.stale_locks.is_empty()
            && self.orphaned_sessions.is_empty()
            && self.dangling_assignments.is_empty()
    }
}

/// Which categories to act on. All four default to selected, matching
/// `cleanup` with no category flags given.
#[derive(Debug, Clone, Copy)]
pub struct CleanupSelection {
    pub worktrees: bool,
    pub locks: bool,
    pub sessions: bool,
    pub assignments: bool,
}

impl CleanupSelection {
    pub fn all() -> Self {
        Self { worktrees: true, locks: true, sessions: true, assignments: true }
    }
}

/// Scan every category without mutating anything.
pub async fn scan(store: &Store, ctx: &EffectContext, config: &HiveConfig, clock: &impl Clock, daemon_config: &DaemonConfig) -> Result<OrphanReport> {
    let _ = clock;
    let state = store.read();

    let known_repo_paths: HashSet<PathBuf> = state.teams.values().map(|t| daemon_config.repos_dir.join(&t.repo_path)).collect();
    let orphaned_worktrees = match std::fs::read_dir(&daemon_config.repos_dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir() && !known_repo_paths.contains(p))
            .collect(),
        Err(_) => Vec::new(),
    };

    let stale_threshold = Duration::from_millis(config.lock.stale_lock_threshold_ms);
    let stale_locks = match std::fs::read_dir(&daemon_config.hive_dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|ext| ext == "lock").unwrap_or(false))
            .filter(|p| lock_age(p).map(|age| age > stale_threshold).unwrap_or(false))
            .collect(),
        Err(_) => Vec::new(),
    };

    let known_session_names: HashSet<String> = state.agents.values().filter_map(|a| a.session_name.clone()).collect();
    let orphaned_sessions: Vec<String> = ctx
        .sessions
        .list_hive_sessions()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.name)
        .filter(|name| !known_session_names.contains(name))
        .collect();

    let dangling_assignments: Vec<StoryId> = state
        .stories
        .values()
        .filter_map(|s| {
            let agent_id = s.assigned_agent_id.as_ref()?;
            match state.get_agent(agent_id.as_str()) {
                Some(agent) if !agent.is_alive() => Some(s.id.clone()),
                None => Some(s.id.clone()),
                _ => None,
            }
        })
        .collect();

    Ok(OrphanReport { orphaned_worktrees, stale_locks, orphaned_sessions, dangling_assignments })
}

fn lock_age(path: &std::path::Path) -> Option<Duration> {
    std::fs::metadata(path).ok()?.modified().ok()?.elapsed().ok()
}

/// Remove the categories named by `selection`. The caller (the CLI's
/// `cleanup` command) is the confirmation gate — nothing here asks again.
pub async fn apply(store: &Store, ctx: &EffectContext, report: &OrphanReport, selection: CleanupSelection, now: u64) -> Result<CheckOutcome> {
    let mut outcome = CheckOutcome::empty();

    if selection.worktrees {
        let mut removed = 0usize;
        for path in &report.orphaned_worktrees {
            match std::fs::remove_dir_all(path) {
                Ok(()) => removed += 1,
                Err(err) => outcome.push_error(format!("cleanup: failed to remove worktree {}: {err}", path.display())),
            }
        }
        if removed > 0 {
            outcome.push_line(format!("cleanup: removed {removed} orphaned worktree(s)"));
        }
    }

    if selection.locks {
        let mut removed = 0usize;
        for path in &report.stale_locks {
            match std::fs::remove_file(path) {
                Ok(()) => removed += 1,
                Err(err) => outcome.push_error(format!("cleanup: failed to remove lock {}: {err}", path.display())),
            }
        }
        if removed > 0 {
            outcome.push_line(format!("cleanup: removed {removed} stale lock file(s)"));
        }
    }

    if selection.sessions {
        let mut removed = 0usize;
        for name in &report.orphaned_sessions {
            match ctx.sessions.kill(name).await {
                Ok(()) => removed += 1,
                Err(err) => outcome.push_error(format!("cleanup: failed to kill session {name}: {err}")),
            }
        }
        if removed > 0 {
            outcome.push_line(format!("cleanup: killed {removed} orphaned session(s)"));
        }
    }

    if selection.assignments {
        let story_ids = report.dangling_assignments.clone();
        let cleared = store.with_transaction(|state| {
            let mut cleared = 0usize;
            for story_id in &story_ids {
                if let Some(story) = state.get_story(story_id.as_str()) {
                    let mut updated = story.clone();
                    updated.assigned_agent_id = None;
                    updated.updated_at_ms = now;
                    state.upsert_story(updated);
                    cleared += 1;
                }
            }
            Ok(cleared)
        })?;
        if cleared > 0 {
            outcome.push_line(format!("cleanup: cleared {cleared} dangling story assignment(s)"));
        }
    }

    Ok(outcome)
}

/// Tick-loop entry point: report only, never mutate (spec.md §4.3.8 requires
/// explicit confirmation before anything is actually removed).
pub async fn run(store: &Store, ctx: &EffectContext, config: &HiveConfig, clock: &impl Clock, daemon_config: &DaemonConfig) -> Result<CheckOutcome> {
    let report = scan(store, ctx, config, clock, daemon_config).await?;
    let mut outcome = CheckOutcome::empty();
    if !report.orphaned_worktrees.is_empty() {
        outcome.push_line(format!("cleanup: found {} orphaned worktree(s) (run `hive cleanup` to remove)", report.orphaned_worktrees.len()));
    }
    if !report.stale_locks.is_empty() {
        outcome.push_line(format!("cleanup: found {} stale lock file(s) (run `hive cleanup` to remove)", report.stale_locks.len()));
    }
    if !report.orphaned_sessions.is_empty() {
        outcome.push_line(format!("cleanup: found {} orphaned session(s) (run `hive cleanup` to remove)", report.orphaned_sessions.len()));
    }
    if !report.dangling_assignments.is_empty() {
        outcome.push_line(format!("cleanup: found {} dangling story assignment(s) (run `hive cleanup` to remove)", report.dangling_assignments.len()));
    }
    Ok(outcome)
}
