// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

use crate::error::{DaemonError, Result};

/// Resolve the hive directory: `HIVE_DIR` > `XDG_STATE_HOME/hive` >
/// `~/.local/state/hive` (spec.md §6: "a per-project hidden directory").
pub fn hive_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("HIVE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("hive"));
    }
    let home = dirs::home_dir().ok_or_else(|| {
        DaemonError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "could not determine home directory"))
    })?;
    Ok(home.join(".local/state/hive"))
}

/// `RUST_LOG`-style filter for the daemon's own log file, defaulting to
/// `info` when unset.
pub fn log_filter() -> String {
    std::env::var("HIVE_LOG").unwrap_or_else(|_| "info".to_string())
}
