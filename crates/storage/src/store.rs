// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Store`]: the shared transactional state store (spec.md §4.1/§5).
//!
//! Every mutation goes through [`Store::with_transaction`], which acquires
//! the cross-process advisory lock, loads the latest snapshot from disk,
//! runs the caller's closure against a clone of [`MaterializedState`], and
//! persists the result before releasing the lock. This is the "phase 3
//! write" half of the Manager Daemon's phase1/phase2/phase3 split (§4.3) —
//! phase 1 (read) and phase 2 (I/O) happen entirely outside any lock, using
//! [`Store::read`] for a consistent snapshot.

use chrono::Utc;
use hive_core::HiveConfig;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::lock;
use crate::snapshot;
use crate::state::MaterializedState;

/// The shared state store for one hive directory.
pub struct Store {
    state_path: PathBuf,
    lock_path: PathBuf,
    lock_timeout: Duration,
    stale_lock_threshold: Duration,
    /// In-process cache of the last-loaded state, refreshed on every
    /// transaction and every explicit `read`. Guards callers against
    /// re-reading from disk for every query within a single process.
    cache: Arc<Mutex<MaterializedState>>,
}

impl Store {
    /// Open (or initialize) the store rooted at `hive_dir`, using the
    /// lock/timeout parameters from `config`.
    pub fn open(hive_dir: &Path, config: &HiveConfig) -> Result<Self> {
        let state_path = hive_dir.join("state.zst");
        let lock_path = hive_dir.join("hive.lock");
        let state = snapshot::load(&state_path)?.unwrap_or_default();

        Ok(Self {
            state_path,
            lock_path,
            lock_timeout: Duration::from_millis(config.lock.acquire_timeout_ms),
            stale_lock_threshold: Duration::from_millis(config.lock.stale_lock_threshold_ms),
            cache: Arc::new(Mutex::new(state)),
        })
    }

    /// A consistent, cheap, in-process snapshot for phase-1 reads. Does not
    /// touch disk or the cross-process lock.
    pub fn read(&self) -> MaterializedState {
        self.cache.lock().clone()
    }

    /// Run `f` against the current state under the cross-process lock,
    /// persist the result, and return `f`'s output. `f` returning `Err`
    /// aborts the transaction without writing anything to disk.
    pub fn with_transaction<T>(
        &self,
        f: impl FnOnce(&mut MaterializedState) -> Result<T>,
    ) -> Result<T> {
        let _guard = lock::acquire(&self.lock_path, self.lock_timeout, self.stale_lock_threshold)?;

        // Reload from disk while holding the lock: another process may have
        // committed a transaction since our last read.
        let mut state = snapshot::load(&self.state_path)?.unwrap_or_default();

        let result = f(&mut state)?;

        snapshot::save(&self.state_path, &state, Utc::now())?;
        *self.cache.lock() = state;

        Ok(result)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
