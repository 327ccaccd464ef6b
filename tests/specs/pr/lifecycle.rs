// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::prelude::*;

fn seeded_with_pr(pr_status: &str) -> Project {
    let project = Project::initialized();
    project.seed(Fixture {
        teams: vec![team("team-acme", "acme")],
        requirements: vec![requirement("req-1", "Add billing", "in_progress")],
        stories: vec![story("story-1", "team-acme", "req-1", "Invoice API", "pr_submitted", Some("agent-1"))],
        agents: vec![agent("agent-1", "senior", "acme-senior-1", Some("team-acme"), "working")],
        pull_requests: vec![pull_request("pr-1", "story-1", "team-acme", pr_status, "agent-1", Some(42))],
        ..Default::default()
    });
    project
}

#[test]
fn queue_lists_open_prs_by_default() {
    let project = seeded_with_pr("queued");
    project.hive().args(["pr", "queue"]).run().passes().stdout_has("pr-1");
}

#[test]
fn queue_excludes_closed_prs_unless_all() {
    let project = seeded_with_pr("merged");
    let ran = project.hive().args(["pr", "queue"]).run().passes();
    assert!(ran.stdout.contains("no pull requests"), "merged prs should not appear by default, got: {}", ran.stdout);

    project.hive().args(["pr", "queue", "--all"]).run().passes().stdout_has("pr-1");
}

#[test]
fn show_prints_pr_detail() {
    let project = seeded_with_pr("queued");
    project.hive().args(["pr", "show", "pr-1"]).run().passes().stdout_has("story-1").stdout_has("queued");
}

#[test]
fn show_unknown_pr_is_a_user_error() {
    let project = Project::initialized();
    project.hive().args(["pr", "show", "pr-nope"]).run().fails();
}

#[test]
fn approve_moves_pr_to_approved() {
    let project = seeded_with_pr("reviewing");
    project
        .hive()
        .args(["pr", "approve", "pr-1", "--reviewer", "agent-qa", "--notes", "looks good"])
        .run()
        .passes()
        .stdout_has("Approved");

    project.hive().args(["pr", "show", "pr-1"]).run().passes().stdout_has("approved").stdout_has("looks good");
}

#[test]
fn reject_moves_pr_and_story_back() {
    let project = seeded_with_pr("reviewing");
    project
        .hive()
        .args(["pr", "reject", "pr-1", "--reviewer", "agent-qa", "--notes", "missing tests"])
        .run()
        .passes()
        .stdout_has("Rejected");

    project.hive().args(["pr", "show", "pr-1"]).run().passes().stdout_has("rejected").stdout_has("missing tests");
}

#[test]
fn sync_with_no_teams_reports_zero() {
    let project = Project::initialized();
    project.hive().args(["pr", "sync"]).run().passes().stdout_has("0 team(s)");
}
