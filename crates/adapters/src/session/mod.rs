// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Session Supervisor: an abstract contract over a terminal multiplexer
//! (spec.md §4.4). Stateless and process-safe — two callers may issue
//! non-destructive operations concurrently, since the multiplexer itself is
//! the source of truth for which sessions exist.

mod fake;
mod tmux;

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeSessionAdapter;
pub use tmux::TmuxSessionAdapter;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// One live session the supervisor knows about, as reported by
/// `listHiveSessions` (spec.md §4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub name: String,
    pub created_at_ms: u64,
}

/// How long `sendMessageWithConfirmation` waits for visible output to
/// change before giving up and reporting no confirmation.
pub const CONFIRMATION_WAIT: Duration = Duration::from_millis(800);

#[async_trait]
pub trait SessionAdapter: Send + Sync {
    /// Create a new session running `argv` in `work_dir`. Fails if a
    /// session named `name` already exists (`AdapterError::SessionAlreadyExists`).
    async fn create_session(&self, name: &str, work_dir: &Path, argv: &[String]) -> Result<()>;

    /// Append `text` to the session's input buffer without pressing enter.
    async fn send_message(&self, name: &str, text: &str) -> Result<()>;

    /// Press enter in a staged session (paired with `send_message`).
    async fn send_enter(&self, name: &str) -> Result<()>;

    /// Send `text`, press enter, and report whether the visible output
    /// changed within [`CONFIRMATION_WAIT`].
    async fn send_message_with_confirmation(&self, name: &str, text: &str) -> Result<bool> {
        let before = self.capture_pane(name, 40).await?;
        self.send_message(name, text).await?;
        self.send_enter(name).await?;
        tokio::time::sleep(CONFIRMATION_WAIT).await;
        let after = self.capture_pane(name, 40).await?;
        Ok(before != after)
    }

    /// The last `lines` lines of the session's visible output.
    async fn capture_pane(&self, name: &str, lines: usize) -> Result<String>;

    /// Whether the multiplexer still has a session by this name.
    async fn is_running(&self, name: &str) -> Result<bool>;

    /// Every live session this supervisor owns (scoped by the `hive-`
    /// session-name prefix, so concurrent unrelated multiplexer sessions on
    /// the same host are never touched).
    async fn list_hive_sessions(&self) -> Result<Vec<SessionInfo>>;

    /// Terminate a session. Idempotent: killing an already-gone session is
    /// not an error.
    async fn kill(&self, name: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn confirmation_reports_true_when_pane_output_changes() {
        let adapter = FakeSessionAdapter::new();
        adapter.create_session("hive-senior-backend", &PathBuf::from("/tmp"), &[]).await.unwrap();
        adapter.set_pane_after_next_send("hive-senior-backend", "changed output");

        let confirmed = adapter
            .send_message_with_confirmation("hive-senior-backend", "hello")
            .await
            .unwrap();
        assert!(confirmed);
    }

    #[tokio::test]
    async fn confirmation_reports_false_when_pane_output_is_unchanged() {
        let adapter = FakeSessionAdapter::new();
        adapter.create_session("hive-senior-backend", &PathBuf::from("/tmp"), &[]).await.unwrap();

        let confirmed = adapter
            .send_message_with_confirmation("hive-senior-backend", "hello")
            .await
            .unwrap();
        assert!(!confirmed);
    }
}
