// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::prelude::*;

fn seeded(story_status: &str) -> Project {
    let project = Project::initialized();
    project.seed(Fixture {
        teams: vec![team("team-acme", "acme")],
        requirements: vec![requirement("req-1", "Add billing", "in_progress")],
        stories: vec![story("story-1", "team-acme", "req-1", "Invoice model", story_status, Some("agent-1"))],
        agents: vec![agent("agent-1", "senior", "acme-senior-1", Some("team-acme"), "working")],
        ..Default::default()
    });
    project
}

#[test]
fn my_stories_lists_assigned_stories_for_the_session() {
    let project = seeded("planned");
    project.hive().args(["my-stories", "acme-senior-1"]).run().passes().stdout_has("story-1").stdout_has("Invoice model");
}

#[test]
fn my_stories_without_a_session_or_env_var_is_a_user_error() {
    let project = seeded("planned");
    project.hive().arg("my-stories").run().fails().stderr_has("HIVE_SESSION");
}

#[test]
fn claim_moves_a_planned_story_to_in_progress() {
    let project = seeded("planned");
    project.hive().args(["my-stories", "claim", "story-1", "--session", "acme-senior-1"]).run().passes().stdout_has("Claimed");

    project.hive().args(["my-stories", "acme-senior-1"]).run().passes().stdout_has("in_progress");
}

#[test]
fn claim_rejects_a_backward_transition() {
    let project = seeded("review");
    project.hive().args(["my-stories", "claim", "story-1", "--session", "acme-senior-1"]).run().fails();
}

#[test]
fn complete_moves_an_in_progress_story_to_review() {
    let project = seeded("in_progress");
    project.hive().args(["my-stories", "complete", "story-1", "--session", "acme-senior-1"]).run().passes().stdout_has("Ready for review");
}

#[test]
fn refactor_requires_qa_failed() {
    let project = seeded("in_progress");
    project
        .hive()
        .args(["my-stories", "refactor", "story-1", "--session", "acme-senior-1", "--message", "fix rounding"])
        .run()
        .fails()
        .stderr_has("not qa_failed");
}

#[test]
fn refactor_moves_a_qa_failed_story_back_to_in_progress() {
    let project = seeded("qa_failed");
    project
        .hive()
        .args(["my-stories", "refactor", "story-1", "--session", "acme-senior-1", "--message", "fix rounding"])
        .run()
        .passes()
        .stdout_has("Back into rework");
}

#[test]
fn progress_records_a_narration_without_changing_status() {
    let project = seeded("in_progress");
    project
        .hive()
        .args(["progress", "story-1", "--message", "wired up the invoice model", "--session", "acme-senior-1"])
        .run()
        .passes()
        .stdout_has("Progress recorded");

    project.hive().args(["logs", "--story", "story-1"]).run().passes().stdout_has("wired up the invoice model");
}

#[test]
fn progress_done_moves_the_story_to_review() {
    let project = seeded("in_progress");
    project
        .hive()
        .args(["progress", "story-1", "--message", "finished", "--done", "--session", "acme-senior-1"])
        .run()
        .passes()
        .stdout_has("Ready for review");

    project.hive().args(["my-stories", "acme-senior-1"]).run().passes().stdout_has("review");
}

#[test]
fn approach_logs_an_intended_approach() {
    let project = seeded("planned");
    project
        .hive()
        .args(["approach", "story-1", "--message", "start with the schema", "--session", "acme-senior-1"])
        .run()
        .passes()
        .stdout_has("Approach recorded");

    project.hive().args(["logs", "--story", "story-1"]).run().passes().stdout_has("approach: start with the schema");
}

#[test]
fn escalate_blocks_the_calling_agent() {
    let project = seeded("in_progress");
    project
        .hive()
        .args(["escalate", "--message", "ambiguous rounding rule", "--story", "story-1", "--session", "acme-senior-1"])
        .run()
        .passes()
        .stdout_has("Escalated");

    project.hive().args(["approvals", "list"]).run().passes().stdout_has("ambiguous rounding rule");
}
