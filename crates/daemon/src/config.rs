// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon filesystem layout (spec.md §6): every path the Manager Daemon
//! touches, rooted at one hive directory. A plain struct, not loaded from
//! its own file — `HiveConfig` (`hive.toml`, inside the same directory)
//! carries the tunable behaviour; this carries only paths.

use std::path::PathBuf;

/// Every path the daemon process needs, rooted at `hive_dir`.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// The workspace root (spec.md §6: "a configuration file, a ...
    /// database file, a subdirectory for agent memory snapshots, a
    /// subdirectory for runtime logs, and a repositories root").
    pub hive_dir: PathBuf,
    /// `hive.toml`.
    pub config_path: PathBuf,
    /// Control-socket path the listener binds (`hive manager status|stop`).
    pub socket_path: PathBuf,
    /// Exclusive single-daemon-instance PID lock, distinct from
    /// `hive-storage`'s per-transaction `hive.lock`.
    pub pid_path: PathBuf,
    /// Daemon-process log file (rotated by `tracing-appender`).
    pub log_dir: PathBuf,
    /// Agent conversational-memory snapshots.
    pub agents_dir: PathBuf,
    /// Each team's working tree lives under here.
    pub repos_dir: PathBuf,
}

impl DaemonConfig {
    pub fn load(hive_dir: PathBuf) -> Self {
        Self {
            config_path: hive_dir.join("hive.toml"),
            socket_path: hive_dir.join("daemon.sock"),
            pid_path: hive_dir.join("daemon.pid"),
            log_dir: hive_dir.join("logs"),
            agents_dir: hive_dir.join("agents"),
            repos_dir: hive_dir.join("repos"),
            hive_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_path_is_rooted_under_the_hive_dir() {
        let config = DaemonConfig::load(PathBuf::from("/tmp/my-hive"));
        assert_eq!(config.socket_path, PathBuf::from("/tmp/my-hive/daemon.sock"));
        assert_eq!(config.pid_path, PathBuf::from("/tmp/my-hive/daemon.pid"));
        assert_eq!(config.config_path, PathBuf::from("/tmp/my-hive/hive.toml"));
    }
}
