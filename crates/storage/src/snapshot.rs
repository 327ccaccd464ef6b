// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot persistence: the entire [`MaterializedState`] as a single
//! zstd-compressed JSON document, rewritten atomically on every committed
//! transaction. `hive-storage` keeps no WAL — the state is small enough
//! (stories, agents, PRs for a handful of teams) that a full rewrite per
//! transaction is cheap and avoids replay complexity entirely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};
use crate::state::MaterializedState;

/// Current snapshot schema version.
pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

const ZSTD_LEVEL: i32 = 3;
const MAX_BAK_FILES: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "v")]
    pub version: u32,
    pub state: MaterializedState,
    pub created_at: DateTime<Utc>,
}

/// Write `state` to `path` as a zstd-compressed JSON snapshot, rotating the
/// previous file into `.bak` first so a crash mid-write never destroys both
/// copies.
pub fn save(path: &Path, state: &MaterializedState, now: DateTime<Utc>) -> Result<()> {
    if path.exists() {
        let bak = rotate_bak_path(path);
        fs::rename(path, &bak)?;
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let snapshot = Snapshot { version: CURRENT_SNAPSHOT_VERSION, state: state.clone(), created_at: now };
    let json = serde_json::to_vec(&snapshot)?;
    let compressed = zstd::encode_all(json.as_slice(), ZSTD_LEVEL)?;

    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, compressed)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Load a snapshot from `path`, if it exists, rebuilding the runtime-only
/// integration-sync index that isn't itself persisted.
pub fn load(path: &Path) -> Result<Option<MaterializedState>> {
    if !path.exists() {
        return Ok(None);
    }
    let compressed = fs::read(path)?;
    let json = zstd::decode_all(compressed.as_slice())?;
    let snapshot: Snapshot = serde_json::from_slice(&json)?;

    if snapshot.version != CURRENT_SNAPSHOT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: snapshot.version,
            expected: CURRENT_SNAPSHOT_VERSION,
        });
    }

    let mut state = snapshot.state;
    state.rebuild_integration_sync_index();
    Ok(Some(state))
}

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `.bak`, `.bak.2`, `.bak.3`. The
/// oldest backup is removed when the limit is reached.
fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
