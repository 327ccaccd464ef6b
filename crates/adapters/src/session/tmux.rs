// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`SessionAdapter`] backed by the `tmux` binary, grounded directly in the
//! teacher's tmux pane-capture/session-kill subprocess handling.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use super::{SessionAdapter, SessionInfo};
use crate::error::{AdapterError, Result};

/// Sessions this supervisor creates are always named `hive-…` (spec.md
/// §4.2's `hive-<role>-<teamSlug>[-n]`), so `listHiveSessions` can filter
/// `tmux list-sessions` output to exactly the ones this tool owns without
/// touching unrelated sessions on the same host.
const HIVE_SESSION_PREFIX: &str = "hive-";

/// Lines of scrollback captured by default; callers may request fewer.
const DEFAULT_CAPTURE_LINES: usize = 200;

pub struct TmuxSessionAdapter;

impl Default for TmuxSessionAdapter {
    fn default() -> Self {
        Self
    }
}

impl TmuxSessionAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionAdapter for TmuxSessionAdapter {
    async fn create_session(&self, name: &str, work_dir: &Path, argv: &[String]) -> Result<()> {
        if self.is_running(name).await? {
            return Err(AdapterError::SessionAlreadyExists(name.to_string()));
        }

        let mut cmd = Command::new("tmux");
        cmd.args(["new-session", "-d", "-s", name, "-c"]).arg(work_dir);
        if !argv.is_empty() {
            cmd.args(argv);
        }

        let output = cmd
            .output()
            .await
            .map_err(|e| AdapterError::SubprocessFailed(format!("tmux new-session: {e}")))?;
        if !output.status.success() {
            return Err(AdapterError::SubprocessFailed(format!(
                "tmux new-session {name} failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(())
    }

    async fn send_message(&self, name: &str, text: &str) -> Result<()> {
        let output = Command::new("tmux")
            .args(["send-keys", "-t", name, "-l", text])
            .output()
            .await
            .map_err(|e| AdapterError::SubprocessFailed(format!("tmux send-keys: {e}")))?;
        if !output.status.success() {
            return Err(AdapterError::SessionNotFound(name.to_string()));
        }
        Ok(())
    }

    async fn send_enter(&self, name: &str) -> Result<()> {
        let output = Command::new("tmux")
            .args(["send-keys", "-t", name, "Enter"])
            .output()
            .await
            .map_err(|e| AdapterError::SubprocessFailed(format!("tmux send-keys Enter: {e}")))?;
        if !output.status.success() {
            return Err(AdapterError::SessionNotFound(name.to_string()));
        }
        Ok(())
    }

    async fn capture_pane(&self, name: &str, lines: usize) -> Result<String> {
        let lines = if lines == 0 { DEFAULT_CAPTURE_LINES } else { lines };
        let scrollback = format!("-{lines}");
        let output = Command::new("tmux")
            .args(["capture-pane", "-t", name, "-p", "-S", &scrollback])
            .output()
            .await
            .map_err(|e| AdapterError::SubprocessFailed(format!("tmux capture-pane: {e}")))?;
        if !output.status.success() {
            return Err(AdapterError::SessionNotFound(name.to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn is_running(&self, name: &str) -> Result<bool> {
        let output = Command::new("tmux")
            .args(["has-session", "-t", name])
            .output()
            .await
            .map_err(|e| AdapterError::SubprocessFailed(format!("tmux has-session: {e}")))?;
        Ok(output.status.success())
    }

    async fn list_hive_sessions(&self) -> Result<Vec<SessionInfo>> {
        let output = Command::new("tmux")
            .args(["list-sessions", "-F", "#{session_name}\t#{session_created}"])
            .output()
            .await
            .map_err(|e| AdapterError::SubprocessFailed(format!("tmux list-sessions: {e}")))?;

        // No server running yet means no sessions, not an error.
        if !output.status.success() {
            return Ok(Vec::new());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let sessions = stdout
            .lines()
            .filter_map(|line| {
                let (name, created_secs) = line.split_once('\t')?;
                if !name.starts_with(HIVE_SESSION_PREFIX) {
                    return None;
                }
                let created_secs: u64 = created_secs.trim().parse().ok()?;
                Some(SessionInfo { name: name.to_string(), created_at_ms: created_secs * 1000 })
            })
            .collect();
        Ok(sessions)
    }

    async fn kill(&self, name: &str) -> Result<()> {
        // Idempotent: a missing session is not an error (spec.md §4.4).
        let _ = Command::new("tmux").args(["kill-session", "-t", name]).output().await;
        Ok(())
    }
}
