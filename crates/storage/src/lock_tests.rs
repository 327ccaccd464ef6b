// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[test]
fn acquire_and_release_allows_reacquire() {
    let dir = tempfile::tempdir().unwrap();
    let lock_path = dir.path().join("hive.lock");

    let lock = acquire(&lock_path, Duration::from_millis(500), Duration::from_secs(120)).unwrap();
    assert!(lock.path().exists());
    drop(lock);

    let lock2 = acquire(&lock_path, Duration::from_millis(500), Duration::from_secs(120)).unwrap();
    assert!(lock2.path().exists());
}

#[test]
fn concurrent_acquire_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let lock_path = dir.path().join("hive.lock");

    let _held = acquire(&lock_path, Duration::from_millis(500), Duration::from_secs(120)).unwrap();
    let result = acquire(&lock_path, Duration::from_millis(100), Duration::from_secs(120));
    assert!(result.is_err());
}

#[test]
fn stale_lock_is_reclaimed() {
    let dir = tempfile::tempdir().unwrap();
    let lock_path = dir.path().join("hive.lock");
    std::fs::write(&lock_path, "99999\n").unwrap();

    // Backdate the lock file's mtime past the stale threshold.
    let old = std::time::SystemTime::now() - Duration::from_secs(300);
    let file = std::fs::OpenOptions::new().write(true).open(&lock_path).unwrap();
    file.set_modified(old).unwrap();
    drop(file);

    let lock = acquire(&lock_path, Duration::from_millis(500), Duration::from_secs(120)).unwrap();
    assert!(lock.path().exists());
}
