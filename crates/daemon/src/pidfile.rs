// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon's own single-instance lock, distinct from
//! `hive-storage::lock::StoreLock` (spec.md §5): that lock is acquired and
//! released once per transaction, this one is acquired once at process
//! startup and held for the daemon's entire lifetime. No stale-reclaim
//! logic is needed — the OS releases an `flock` the moment the holding
//! process exits, crash or not, so a second `hive manager start` simply
//! fails to acquire it while the first is still alive.

use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{DaemonError, Result};

/// RAII guard over the daemon's PID file. Releases the lock and removes
/// the file on drop.
pub struct PidLock {
    file: File,
    path: PathBuf,
}

impl Drop for PidLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        let _ = fs::remove_file(&self.path);
    }
}

/// Acquire the exclusive daemon lock at `path`, writing the current PID
/// into it. Fails immediately with [`DaemonError::AlreadyRunning`] if
/// another process already holds it — there is nothing to wait for, since
/// only one daemon instance may ever run against a given hive directory.
pub fn acquire(path: &Path) -> Result<PidLock> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().write(true).create(true).truncate(false).open(path)?;
    file.try_lock_exclusive().map_err(|_| DaemonError::AlreadyRunning(path.to_path_buf()))?;

    let mut file = file;
    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())?;

    Ok(PidLock { file, path: path.to_path_buf() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn a_second_acquire_on_the_same_path_fails_while_the_first_is_held() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("daemon.pid");

        let first = acquire(&path).unwrap();
        let err = acquire(&path).unwrap_err();
        assert!(matches!(err, DaemonError::AlreadyRunning(_)));
        drop(first);

        assert!(acquire(&path).is_ok());
    }

    #[test]
    fn dropping_the_lock_removes_the_pid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("daemon.pid");

        let lock = acquire(&path).unwrap();
        drop(lock);
        assert!(!path.exists());
    }
}
