// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hive_core::test_support::test_team;

fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

#[test]
fn save_then_load_round_trips_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.zst");

    let mut state = MaterializedState::default();
    state.upsert_team(test_team("acme"));

    save(&path, &state, now()).unwrap();
    let loaded = load(&path).unwrap().unwrap();
    assert_eq!(loaded.teams.len(), 1);
}

#[test]
fn loading_missing_path_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.zst");
    assert!(load(&path).unwrap().is_none());
}

#[test]
fn second_save_rotates_previous_into_bak() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.zst");

    let state = MaterializedState::default();
    save(&path, &state, now()).unwrap();
    save(&path, &state, now()).unwrap();

    assert!(path.with_extension("bak").exists());
}

#[test]
fn mismatched_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.zst");

    let snapshot = Snapshot { version: 999, state: MaterializedState::default(), created_at: now() };
    let json = serde_json::to_vec(&snapshot).unwrap();
    let compressed = zstd::encode_all(json.as_slice(), 3).unwrap();
    std::fs::write(&path, compressed).unwrap();

    let result = load(&path);
    assert!(matches!(result, Err(StoreError::UnsupportedVersion { .. })));
}
