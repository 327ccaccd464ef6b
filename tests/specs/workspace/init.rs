// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::prelude::*;

#[test]
fn init_creates_workspace_layout() {
    let project = Project::empty();
    project.hive().arg("init").run().passes().stdout_has("Initialized hive workspace");

    assert!(project.path().join("hive.toml").exists());
    assert!(project.path().join("state.zst").exists());
    assert!(project.path().join("agents").is_dir());
    assert!(project.path().join("logs").is_dir());
    assert!(project.path().join("repos").is_dir());
}

#[test]
fn re_init_without_force_is_a_user_error() {
    let project = Project::initialized();
    project.hive().arg("init").run().fails().stderr_has("already exists");
}

#[test]
fn re_init_with_force_succeeds() {
    let project = Project::initialized();
    project.hive().args(["init", "--force"]).run().passes();
}

#[test]
fn add_repo_registers_a_team() {
    let project = Project::initialized();
    project
        .hive()
        .args(["add-repo", "git@example.com:acme/widgets.git", "--team", "widgets"])
        .run()
        .passes()
        .stdout_has("Registered team");
}

#[test]
fn add_repo_rejects_duplicate_team_names() {
    let project = Project::initialized();
    project.hive().args(["add-repo", "git@example.com:acme/widgets.git", "--team", "widgets"]).run().passes();
    project
        .hive()
        .args(["add-repo", "git@example.com:acme/widgets-fork.git", "--team", "widgets"])
        .run()
        .fails()
        .stderr_has("already exists");
}

#[test]
fn commands_before_init_fail_with_a_guiding_error() {
    let project = Project::empty();
    project.hive().arg("status").run().fails().stderr_has("hive init");
}
