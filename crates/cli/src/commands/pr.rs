// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive pr submit|queue|review|show|approve|reject|sync` (spec.md §6): the
//! agent-facing and human-facing sides of the merge queue. `submit` is
//! issued from inside a worker's session once its story reaches `review`;
//! `approve`/`reject` are issued from inside a QA session; `queue`/`show`
//! are the human-facing read side; `sync` reconciles against the VCS host.

use std::collections::BTreeMap;
use std::path::Path;

use hive_core::{
    EventType, LogEntry, LogEntryId, PrStatus, PullRequest, PullRequestId, StoryStatus,
};
use serde::Serialize;

use crate::context;
use crate::exit_error::ExitError;
use crate::output::{self, OutputFormat};

/// `hive pr submit <story>` — a worker submits its current story's branch.
pub async fn submit(story_id: String, agent_id: String) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let now = ctx.now_ms();

    let (story, team, existing_open) = {
        let state = ctx.store.read();
        let story = state.get_story(&story_id).cloned().ok_or_else(|| ExitError::user(format!("no story {story_id}")))?;
        let team = state.get_team(story.team_id.as_str()).cloned().ok_or_else(|| ExitError::internal(format!("story {} has no team", story.id)))?;
        let existing_open: Vec<PullRequestId> =
            state.pull_requests.values().filter(|pr| pr.story_id == story.id && pr.status.is_open()).map(|pr| pr.id.clone()).collect();
        (story, team, existing_open)
    };

    let branch_name = story.branch_name.clone().unwrap_or_else(|| format!("story/{}", story.id.suffix()));
    let title = story.title.clone();
    let body = format!("Closes {}\n\n{}", story.id, story.description);

    let external = ctx
        .effects
        .vcs
        .submit_pr(Path::new(&team.repo_path), &branch_name, &title, &body)
        .await
        .map_err(ExitError::from)?;

    let pr = PullRequest {
        id: PullRequestId::new(),
        story_id: story.id.clone(),
        team_id: team.id,
        branch_name: branch_name.clone(),
        external_number: Some(external.number),
        external_url: Some(external.url.clone()),
        status: PrStatus::Queued,
        submitter_agent_id: agent_id.clone().into(),
        reviewer_agent_id: None,
        review_notes: None,
        created_at_ms: now,
        updated_at_ms: now,
    };

    ctx.store.with_transaction(|state| {
        // A duplicate submission for the same story auto-closes whatever
        // was already queued (spec.md §3 invariant, §8 scenario 5).
        for prior_id in &existing_open {
            if let Some(prior) = state.get_pull_request(prior_id.as_str()) {
                let mut closed = prior.clone();
                closed.status = PrStatus::Closed;
                closed.updated_at_ms = now;
                state.upsert_pull_request(closed);
                state.append_log_entry(LogEntry {
                    id: LogEntryId::new(),
                    agent_id: Some(agent_id.clone().into()),
                    story_id: Some(story.id.clone()),
                    event_type: EventType::PrClosed,
                    message: format!("pr {prior_id} auto-closed by duplicate submission"),
                    metadata: BTreeMap::new(),
                    created_at_ms: now,
                });
            }
        }

        state.upsert_pull_request(pr.clone());
        if let Some(fresh) = state.get_story(story.id.as_str()) {
            let mut updated = fresh.clone();
            updated.status = StoryStatus::PrSubmitted;
            updated.updated_at_ms = now;
            state.upsert_story(updated);
        }
        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: Some(agent_id.clone().into()),
            story_id: Some(story.id.clone()),
            event_type: EventType::PrSubmitted,
            message: format!("pr {} submitted for {}: {}", pr.id, story.id, external.url),
            metadata: BTreeMap::new(),
            created_at_ms: now,
        });
        Ok(())
    })?;

    println!("{} {} ({})", crate::color::header("Submitted pr"), pr.id, crate::color::context(&external.url));
    Ok(())
}

#[derive(Serialize)]
struct PrRow {
    id: String,
    story_id: String,
    team: String,
    branch: String,
    status: String,
    external_url: Option<String>,
}

/// `hive pr queue [--all] [--json]` — list open (or all) PRs.
pub fn queue(all: bool, format: OutputFormat) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let state = ctx.store.read();

    let mut rows: Vec<PrRow> = state
        .pull_requests
        .values()
        .filter(|pr| all || pr.status.is_open())
        .map(|pr| PrRow {
            id: pr.id.to_string(),
            story_id: pr.story_id.to_string(),
            team: state.get_team(pr.team_id.as_str()).map(|t| t.display_name.clone()).unwrap_or_default(),
            branch: pr.branch_name.clone(),
            status: pr.status.to_string(),
            external_url: pr.external_url.clone(),
        })
        .collect();
    rows.sort_by(|a, b| a.id.cmp(&b.id));

    output::handle_list(format, &rows, "no pull requests", |rows| {
        for row in rows {
            println!("{}  {}  {}  {}", crate::color::context(&row.id), row.status, row.team, row.branch);
        }
    })
    .map_err(|e| ExitError::internal(e.to_string()))
}

/// `hive pr show <id>` — full detail on a single PR.
pub fn show(pr_id: String, format: OutputFormat) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let state = ctx.store.read();
    let pr = state.get_pull_request(&pr_id).cloned().ok_or_else(|| ExitError::user(format!("no pull request {pr_id}")))?;

    output::format_or_json(format, &pr, || {
        println!("{} {}", crate::color::header("Pull request"), pr.id);
        println!("  story:    {}", pr.story_id);
        println!("  branch:   {}", pr.branch_name);
        println!("  status:   {}", pr.status);
        if let Some(url) = &pr.external_url {
            println!("  url:      {url}");
        }
        if let Some(notes) = &pr.review_notes {
            println!("  notes:    {notes}");
        }
    })
    .map_err(|e| ExitError::internal(e.to_string()))
}

/// `hive pr review <id> <reviewer-agent>` — a QA agent claims the review.
pub async fn review(pr_id: String, reviewer_agent_id: String) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let now = ctx.now_ms();

    let pr = ctx.store.read().get_pull_request(&pr_id).cloned().ok_or_else(|| ExitError::user(format!("no pull request {pr_id}")))?;
    if !pr.status.is_open() {
        return Err(ExitError::user(format!("pr {} is {}, not open", pr.id, pr.status)));
    }

    ctx.store.with_transaction(|state| {
        if let Some(fresh) = state.get_pull_request(pr.id.as_str()) {
            let mut updated = fresh.clone();
            updated.status = PrStatus::Reviewing;
            updated.reviewer_agent_id = Some(reviewer_agent_id.clone().into());
            updated.updated_at_ms = now;
            state.upsert_pull_request(updated);
        }
        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: Some(reviewer_agent_id.clone().into()),
            story_id: Some(pr.story_id.clone()),
            event_type: EventType::PrReviewStarted,
            message: format!("pr {} review started by {reviewer_agent_id}", pr.id),
            metadata: BTreeMap::new(),
            created_at_ms: now,
        });
        Ok(())
    })?;

    println!("{} {}", crate::color::header("Review started on"), pr.id);
    Ok(())
}

/// `hive pr approve <id> [-m notes]` — QA approves; queued for auto-merge.
pub async fn approve(pr_id: String, reviewer_agent_id: String, notes: Option<String>) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let now = ctx.now_ms();

    let pr = ctx.store.read().get_pull_request(&pr_id).cloned().ok_or_else(|| ExitError::user(format!("no pull request {pr_id}")))?;
    let external_number = pr.external_number.ok_or_else(|| ExitError::internal(format!("pr {} has no external number", pr.id)))?;
    let team = ctx.store.read().get_team(pr.team_id.as_str()).cloned().ok_or_else(|| ExitError::internal("team not found"))?;

    ctx.effects.vcs.approve_pr(Path::new(&team.repo_path), external_number).await.map_err(ExitError::from)?;

    ctx.store.with_transaction(|state| {
        if let Some(fresh) = state.get_pull_request(pr.id.as_str()) {
            let mut updated = fresh.clone();
            updated.status = PrStatus::Approved;
            updated.review_notes = notes.clone();
            updated.updated_at_ms = now;
            state.upsert_pull_request(updated);
        }
        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: Some(reviewer_agent_id.clone().into()),
            story_id: Some(pr.story_id.clone()),
            event_type: EventType::PrApproved,
            message: format!("pr {} approved by {reviewer_agent_id}", pr.id),
            metadata: BTreeMap::new(),
            created_at_ms: now,
        });
        Ok(())
    })?;

    println!("{} {} (queued for merge)", crate::color::good("Approved"), pr.id);
    Ok(())
}

/// `hive pr reject <id> -m notes` — QA rejects; story kicks back for rework.
pub async fn reject(pr_id: String, reviewer_agent_id: String, notes: String) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let now = ctx.now_ms();

    let pr = ctx.store.read().get_pull_request(&pr_id).cloned().ok_or_else(|| ExitError::user(format!("no pull request {pr_id}")))?;

    ctx.store.with_transaction(|state| {
        if let Some(fresh) = state.get_pull_request(pr.id.as_str()) {
            let mut updated = fresh.clone();
            updated.status = PrStatus::Rejected;
            updated.review_notes = Some(notes.clone());
            updated.updated_at_ms = now;
            state.upsert_pull_request(updated);
        }
        if let Some(fresh) = state.get_story(pr.story_id.as_str()) {
            let mut updated = fresh.clone();
            updated.status = StoryStatus::QaFailed;
            updated.updated_at_ms = now;
            state.upsert_story(updated);
        }
        state.append_log_entry(LogEntry {
            id: LogEntryId::new(),
            agent_id: Some(reviewer_agent_id.clone().into()),
            story_id: Some(pr.story_id.clone()),
            event_type: EventType::PrRejected,
            message: format!("pr {} rejected by {reviewer_agent_id}: {notes}", pr.id),
            metadata: BTreeMap::new(),
            created_at_ms: now,
        });
        Ok(())
    })?;

    println!("{} {}", crate::color::bad("Rejected"), pr.id);
    Ok(())
}

/// `hive pr sync` — reconcile the local queue against the VCS host's view
/// of open PRs per team (spec.md §4.6).
pub async fn sync() -> Result<(), ExitError> {
    let ctx = context::open()?;
    let state = ctx.store.read();
    let mut checked = 0usize;
    let mut mismatches = Vec::new();

    for team in state.teams.values() {
        let external = match ctx.effects.vcs.list_open_prs(Path::new(&team.repo_path)).await {
            Ok(prs) => prs,
            Err(err) => {
                mismatches.push(format!("{}: failed to list open prs: {err}", team.display_name));
                continue;
            }
        };
        checked += 1;
        let local_open: std::collections::HashSet<u64> =
            state.open_pull_requests_for_team(&team.id).filter_map(|pr| pr.external_number).collect();
        for pr in &external {
            if !local_open.contains(&pr.number) {
                mismatches.push(format!("{}: pr #{} is open upstream but not tracked locally", team.display_name, pr.number));
            }
        }
    }

    println!("{} {checked} team(s)", crate::color::header("Synced"));
    for mismatch in &mismatches {
        crate::output::print_failure_line(mismatch);
    }
    Ok(())
}
