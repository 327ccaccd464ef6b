// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness: an isolated `HIVE_DIR` per test, a way to run the `hive`
//! binary against it, and a way to seed `state.zst` fixtures without
//! depending on `hive-core`/`hive-storage` — this crate only ever talks to
//! the workspace the way the binary itself does, through the filesystem.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::{json, Map, Value};
use tempfile::TempDir;

/// Bare `hive` invocation with no workspace — for `--help`/`--version`.
pub fn cli() -> Command {
    let mut cmd = Command::cargo_bin("hive").expect("hive binary should be built by `cargo test`");
    cmd.env("NO_COLOR", "1");
    cmd
}

pub struct Project {
    dir: TempDir,
}

impl Project {
    /// An empty temp directory; nothing is initialized yet.
    pub fn empty() -> Self {
        Self { dir: tempfile::tempdir().expect("tempdir") }
    }

    /// An initialized workspace (`hive init` already run).
    pub fn initialized() -> Self {
        let project = Self::empty();
        project.hive().args(["init"]).assert().success();
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn state_path(&self) -> PathBuf {
        self.dir.path().join("state.zst")
    }

    /// `hive` pointed at this workspace via `HIVE_DIR`.
    pub fn hive(&self) -> Command {
        let mut cmd = cli();
        cmd.env("HIVE_DIR", self.dir.path());
        cmd
    }

    /// Overwrite `state.zst` with a snapshot built from the given entity
    /// lists, matching `hive_storage::snapshot::Snapshot`'s wire format
    /// (`{"v": 1, "state": {...}, "created_at": "..."}`, zstd level 3 over
    /// the JSON bytes). Every list is keyed by each entity's own `id` field,
    /// mirroring `MaterializedState`'s `HashMap<String, T>` tables.
    pub fn seed(&self, fixture: Fixture) {
        let state = json!({
            "teams": index_by_id(fixture.teams),
            "requirements": index_by_id(fixture.requirements),
            "stories": index_by_id(fixture.stories),
            "agents": index_by_id(fixture.agents),
            "pull_requests": index_by_id(fixture.pull_requests),
            "escalations": index_by_id(fixture.escalations),
            "log_entries": index_by_id(fixture.log_entries),
            "integration_syncs": {},
        });
        let snapshot = json!({
            "v": 1,
            "state": state,
            "created_at": "2026-01-01T00:00:00Z",
        });
        let bytes = serde_json::to_vec(&snapshot).expect("serialize fixture snapshot");
        let compressed = zstd::encode_all(bytes.as_slice(), 3).expect("zstd-encode fixture snapshot");
        std::fs::write(self.state_path(), compressed).expect("write fixture state.zst");
    }
}

fn index_by_id(items: Vec<Value>) -> Value {
    let mut map = Map::new();
    for item in items {
        let id = item.get("id").and_then(Value::as_str).expect("fixture entity must have a string \"id\"").to_string();
        map.insert(id, item);
    }
    Value::Object(map)
}

/// A partial set of entity tables to seed into `state.zst`; every list
/// defaults to empty so a test only has to specify what it cares about.
#[derive(Default)]
pub struct Fixture {
    pub teams: Vec<Value>,
    pub requirements: Vec<Value>,
    pub stories: Vec<Value>,
    pub agents: Vec<Value>,
    pub pull_requests: Vec<Value>,
    pub escalations: Vec<Value>,
    pub log_entries: Vec<Value>,
}

/// A minimal `Team` row, matching `hive_core::Team`'s field set.
pub fn team(id: &str, display_name: &str) -> Value {
    json!({
        "id": id,
        "display_name": display_name,
        "repo_url": format!("git@example.com:{display_name}.git"),
        "repo_path": display_name,
        "junior_max": 2,
        "intermediate_max": 2,
        "senior_max": 1,
        "qa_max": 1,
        "created_at_ms": 0,
        "updated_at_ms": 0,
    })
}

/// A minimal `Story` row assigned to `agent_id` (or unassigned if `None`).
pub fn story(id: &str, team_id: &str, requirement_id: &str, title: &str, status: &str, agent_id: Option<&str>) -> Value {
    json!({
        "id": id,
        "requirement_id": requirement_id,
        "team_id": team_id,
        "title": title,
        "description": "",
        "acceptance_criteria": [],
        "complexity": 3,
        "story_points": 0,
        "dependency_set": [],
        "assigned_agent_id": agent_id,
        "branch_name": null,
        "status": status,
        "pm_keys": { "issue_key": null, "subtask_key": null, "project_key": null, "provider": null },
        "in_sprint": false,
        "created_at_ms": 0,
        "updated_at_ms": 0,
    })
}

/// A minimal `Requirement` row.
pub fn requirement(id: &str, title: &str, status: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": title,
        "submitter": "test",
        "status": status,
        "external_epic_key": null,
        "feature_branch": null,
        "target_branch": "main",
        "godmode": false,
        "created_at_ms": 0,
        "updated_at_ms": 0,
    })
}

/// A minimal `Agent` row with a tmux-session name a test can address via
/// `--session`.
pub fn agent(id: &str, role: &str, session_name: &str, team_id: Option<&str>, status: &str) -> Value {
    json!({
        "id": id,
        "role": role,
        "team_id": team_id,
        "session_name": session_name,
        "cli_flavor": "claude",
        "status": status,
        "current_story_id": null,
        "memory_path": null,
        "last_seen_ms": 0,
        "created_at_ms": 0,
        "updated_at_ms": 0,
    })
}

/// A minimal `PullRequest` row.
pub fn pull_request(id: &str, story_id: &str, team_id: &str, status: &str, submitter_agent_id: &str, external_number: Option<u64>) -> Value {
    json!({
        "id": id,
        "story_id": story_id,
        "team_id": team_id,
        "branch_name": format!("story/{story_id}"),
        "external_number": external_number,
        "external_url": null,
        "status": status,
        "submitter_agent_id": submitter_agent_id,
        "reviewer_agent_id": null,
        "review_notes": null,
        "created_at_ms": 0,
        "updated_at_ms": 0,
    })
}

/// A minimal `Escalation` row.
pub fn escalation(id: &str, reason: &str, from_agent_id: Option<&str>) -> Value {
    json!({
        "id": id,
        "story_id": null,
        "from_agent_id": from_agent_id,
        "to_agent_id": null,
        "reason": reason,
        "status": "pending",
        "resolution": null,
        "created_at_ms": 0,
        "updated_at_ms": 0,
    })
}

/// A finished process run, captured once so assertions can be chained
/// without re-running the command.
pub struct Ran {
    pub status_success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl Ran {
    /// Assert the process exited 0, returning `self` for chaining.
    pub fn passes(self) -> Self {
        assert!(self.status_success, "expected success, got failure\nstdout: {}\nstderr: {}", self.stdout, self.stderr);
        self
    }

    /// Assert the process exited non-zero, returning `self` for chaining.
    pub fn fails(self) -> Self {
        assert!(!self.status_success, "expected failure, got success\nstdout: {}\nstderr: {}", self.stdout, self.stderr);
        self
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "expected stdout to contain {needle:?}, got: {}", self.stdout);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "expected stderr to contain {needle:?}, got: {}", self.stderr);
        self
    }
}

/// Run a [`Command`] to completion and capture it as a [`Ran`].
pub trait RunExt {
    fn run(self) -> Ran;
}

impl RunExt for Command {
    fn run(mut self) -> Ran {
        let output = self.output().expect("spawn hive");
        Ran {
            status_success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}
