// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-process advisory lock guarding the hive directory's state file
//! (spec.md §5). Acquired once per `Store::with_transaction` call, held for
//! the whole phase-3 read-modify-write, and released on drop.
//!
//! A lock file older than the stale threshold is assumed to belong to a
//! crashed process and is reclaimed rather than waited on forever.

use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{Result, StoreError};

/// RAII guard: the lock is released when dropped.
pub struct StoreLock {
    _file: File,
    path: PathBuf,
}

impl StoreLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = self._file.unlock();
    }
}

/// Acquire an exclusive lock on `path`, retrying with jittered backoff up to
/// `timeout`. A lock file whose mtime exceeds `stale_threshold` is reclaimed
/// (deleted and recreated) on the assumption the owning process crashed.
pub fn acquire(path: &Path, timeout: Duration, stale_threshold: Duration) -> Result<StoreLock> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let deadline = Instant::now() + timeout;
    let mut attempt: u32 = 0;

    loop {
        reclaim_if_stale(path, stale_threshold);

        let file = OpenOptions::new().write(true).create(true).truncate(false).open(path)?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                use std::io::Write;
                let mut file = file;
                file.set_len(0)?;
                writeln!(file, "{}", std::process::id())?;
                return Ok(StoreLock { _file: file, path: path.to_path_buf() });
            }
            Err(_) if Instant::now() >= deadline => {
                return Err(StoreError::LockFailed {
                    path: path.to_path_buf(),
                    reason: format!("timed out after {timeout:?}"),
                });
            }
            Err(_) => {
                let backoff = jittered_backoff(attempt);
                std::thread::sleep(backoff.min(deadline.saturating_duration_since(Instant::now())));
                attempt = attempt.saturating_add(1);
            }
        }
    }
}

/// Delete the lock file if its mtime is older than `stale_threshold`. A
/// process holding the lock never has its mtime refreshed by this check
/// (only `acquire` writes to the file), so live locks are never reclaimed:
/// the subsequent `try_lock_exclusive` still fails if the owner is alive.
fn reclaim_if_stale(path: &Path, stale_threshold: Duration) {
    let Ok(metadata) = fs::metadata(path) else { return };
    let Ok(modified) = metadata.modified() else { return };
    let Ok(age) = modified.elapsed() else { return };
    if age > stale_threshold {
        let _ = fs::remove_file(path);
    }
}

/// Exponential backoff capped at 500ms, with up to 50% random jitter to
/// avoid synchronized retries across processes contending for the same lock.
fn jittered_backoff(attempt: u32) -> Duration {
    const BASE_MS: u64 = 20;
    const CAP_MS: u64 = 500;
    let exp = BASE_MS.saturating_mul(1u64 << attempt.min(6));
    let capped = exp.min(CAP_MS);
    let jitter = (capped / 2).max(1);
    let salt = std::process::id() as u64 ^ (attempt as u64).wrapping_mul(2_654_435_761);
    Duration::from_millis(capped - jitter + (salt % (jitter + 1)))
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
