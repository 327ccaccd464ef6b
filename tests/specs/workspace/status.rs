// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::prelude::*;

fn seeded() -> Project {
    let project = Project::initialized();
    project.seed(Fixture {
        teams: vec![team("team-acme", "acme")],
        requirements: vec![requirement("req-1", "Add billing", "in_progress")],
        stories: vec![
            story("story-1", "team-acme", "req-1", "Invoice model", "in_progress", Some("agent-1")),
            story("story-2", "team-acme", "req-1", "Invoice API", "review", Some("agent-1")),
        ],
        agents: vec![agent("agent-1", "senior", "acme-senior-1", Some("team-acme"), "working")],
        pull_requests: vec![pull_request("pr-1", "story-2", "team-acme", "queued", "agent-1", Some(7))],
        escalations: vec![escalation("esc-1", "need a decision on invoice rounding", Some("agent-1"))],
        ..Default::default()
    });
    project
}

#[test]
fn status_text_rollup_reflects_seeded_state() {
    let project = seeded();
    let ran = project.hive().arg("status").run().passes();
    ran.stdout_has("Teams:").stdout_has("Merge queue depth:").stdout_has("Pending escalations:");
    assert!(ran.stdout.contains("in_progress: 1"), "expected an in_progress story count, got: {}", ran.stdout);
}

#[test]
fn status_json_reports_exact_counts() {
    let project = seeded();
    let ran = project.hive().args(["status", "--format", "json"]).run().passes();
    let parsed: serde_json::Value = serde_json::from_str(&ran.stdout).expect("status --format json should be valid JSON");
    assert_eq!(parsed["teams"], 1);
    assert_eq!(parsed["alive_agents"], 1);
    assert_eq!(parsed["merge_queue_depth"], 1);
    assert_eq!(parsed["pending_escalations"], 1);
    assert_eq!(parsed["stories_by_status"]["in_progress"], 1);
    assert_eq!(parsed["stories_by_status"]["review"], 1);
}

#[test]
fn logs_filters_by_story_and_since() {
    let project = seeded();
    project.seed(Fixture {
        teams: vec![team("team-acme", "acme")],
        agents: vec![agent("agent-1", "senior", "acme-senior-1", Some("team-acme"), "working")],
        stories: vec![story("story-1", "team-acme", "req-1", "Invoice model", "in_progress", Some("agent-1"))],
        log_entries: vec![
            serde_json::json!({
                "id": "log-1",
                "agent_id": "agent-1",
                "story_id": "story-1",
                "event_type": "STORY_ASSIGNED",
                "message": "agent-1 claimed story-1",
                "metadata": {},
                "created_at_ms": 1000,
            }),
            serde_json::json!({
                "id": "log-2",
                "agent_id": "agent-1",
                "story_id": null,
                "event_type": "ESCALATION_CREATED",
                "message": "agent-1 raised an escalation",
                "metadata": {},
                "created_at_ms": 2000,
            }),
        ],
        ..Default::default()
    });

    let ran = project.hive().args(["logs", "--story", "story-1"]).run().passes();
    assert!(ran.stdout.contains("claimed story-1"), "expected the story-scoped entry, got: {}", ran.stdout);
    assert!(!ran.stdout.contains("raised an escalation"), "story filter should exclude unrelated entries, got: {}", ran.stdout);

    let ran = project.hive().args(["logs", "--since", "1500"]).run().passes();
    assert!(ran.stdout.contains("raised an escalation"));
    assert!(!ran.stdout.contains("claimed story-1"), "since filter should exclude older entries, got: {}", ran.stdout);
}

#[test]
fn logs_with_no_matches_says_so() {
    let project = Project::initialized();
    project.hive().arg("logs").run().passes().stdout_has("no matching log entries");
}
