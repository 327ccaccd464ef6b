// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::prelude::*;

fn seeded() -> Project {
    let project = Project::initialized();
    project.seed(Fixture {
        agents: vec![agent("agent-1", "senior", "acme-senior-1", None, "blocked")],
        escalations: vec![escalation("esc-1", "need a decision on invoice rounding", Some("agent-1"))],
        ..Default::default()
    });
    project
}

#[test]
fn list_shows_pending_escalations_by_default() {
    let project = seeded();
    project.hive().args(["approvals", "list"]).run().passes().stdout_has("esc-1").stdout_has("invoice rounding");
}

#[test]
fn show_prints_escalation_detail() {
    let project = seeded();
    project.hive().args(["approvals", "show", "esc-1"]).run().passes().stdout_has("pending").stdout_has("agent-1");
}

#[test]
fn approve_resolves_the_escalation() {
    let project = seeded();
    project.hive().args(["approvals", "approve", "esc-1", "--resolution", "round to nearest cent"]).run().passes().stdout_has("Approved");

    project.hive().args(["approvals", "show", "esc-1"]).run().passes().stdout_has("resolved").stdout_has("round to nearest cent");
}

#[test]
fn deny_resolves_without_unblocking() {
    let project = seeded();
    project.hive().args(["approvals", "deny", "esc-1", "--resolution", "not now"]).run().passes().stdout_has("Denied");
    project.hive().args(["approvals", "show", "esc-1"]).run().passes().stdout_has("resolved");
}

#[test]
fn resolving_twice_is_a_user_error() {
    let project = seeded();
    project.hive().args(["approvals", "approve", "esc-1", "--resolution", "ok"]).run().passes();
    project.hive().args(["approvals", "approve", "esc-1", "--resolution", "again"]).run().fails().stderr_has("already");
}
