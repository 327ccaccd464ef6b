// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory [`SessionAdapter`] used by Scheduler/Manager tests. Records
//! every call so tests can assert on what was sent, to which session, in
//! what order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{SessionAdapter, SessionInfo};
use crate::error::{AdapterError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    CreateSession { name: String, work_dir: PathBuf, argv: Vec<String> },
    SendMessage { name: String, text: String },
    SendEnter { name: String },
    CapturePane { name: String },
    Kill { name: String },
}

struct Session {
    created_at_ms: u64,
    work_dir: PathBuf,
    argv: Vec<String>,
    pane: String,
    alive: bool,
    /// When set, the next captured pane after a send reflects this instead
    /// of the session's static `pane` field, modeling visible progress.
    pending_pane_after_send: Option<String>,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<String, Session>,
    calls: Vec<RecordedCall>,
    next_created_at_ms: u64,
}

/// Test-support [`SessionAdapter`] backed by an in-process map.
#[derive(Clone, Default)]
pub struct FakeSessionAdapter {
    inner: Arc<Mutex<Inner>>,
}

impl FakeSessionAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the pane content a session reports on its *next* capture after a
    /// send — used to simulate an agent's visible output moving forward.
    pub fn set_pane_after_next_send(&self, name: &str, pane: impl Into<String>) {
        let mut inner = self.inner.lock();
        if let Some(session) = inner.sessions.get_mut(name) {
            session.pending_pane_after_send = Some(pane.into());
        }
    }

    /// Directly set the pane content a session reports on capture.
    pub fn set_pane(&self, name: &str, pane: impl Into<String>) {
        let mut inner = self.inner.lock();
        if let Some(session) = inner.sessions.get_mut(name) {
            session.pane = pane.into();
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.lock().calls.clone()
    }

    pub fn session_exists(&self, name: &str) -> bool {
        self.inner.lock().sessions.contains_key(name)
    }
}

#[async_trait]
impl SessionAdapter for FakeSessionAdapter {
    async fn create_session(&self, name: &str, work_dir: &Path, argv: &[String]) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.sessions.contains_key(name) {
            return Err(AdapterError::SessionAlreadyExists(name.to_string()));
        }
        let created_at_ms = inner.next_created_at_ms;
        inner.next_created_at_ms += 1;
        inner.sessions.insert(
            name.to_string(),
            Session {
                created_at_ms,
                work_dir: work_dir.to_path_buf(),
                argv: argv.to_vec(),
                pane: String::new(),
                alive: true,
                pending_pane_after_send: None,
            },
        );
        inner.calls.push(RecordedCall::CreateSession {
            name: name.to_string(),
            work_dir: work_dir.to_path_buf(),
            argv: argv.to_vec(),
        });
        Ok(())
    }

    async fn send_message(&self, name: &str, text: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        let session = inner
            .sessions
            .get_mut(name)
            .ok_or_else(|| AdapterError::SessionNotFound(name.to_string()))?;
        if let Some(pending) = session.pending_pane_after_send.take() {
            session.pane = pending;
        }
        inner.calls.push(RecordedCall::SendMessage { name: name.to_string(), text: text.to_string() });
        Ok(())
    }

    async fn send_enter(&self, name: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.sessions.contains_key(name) {
            return Err(AdapterError::SessionNotFound(name.to_string()));
        }
        inner.calls.push(RecordedCall::SendEnter { name: name.to_string() });
        Ok(())
    }

    async fn capture_pane(&self, name: &str, _lines: usize) -> Result<String> {
        let mut inner = self.inner.lock();
        let pane = inner
            .sessions
            .get(name)
            .map(|s| s.pane.clone())
            .ok_or_else(|| AdapterError::SessionNotFound(name.to_string()))?;
        inner.calls.push(RecordedCall::CapturePane { name: name.to_string() });
        Ok(pane)
    }

    async fn is_running(&self, name: &str) -> Result<bool> {
        Ok(self.inner.lock().sessions.get(name).map(|s| s.alive).unwrap_or(false))
    }

    async fn list_hive_sessions(&self) -> Result<Vec<SessionInfo>> {
        let inner = self.inner.lock();
        Ok(inner
            .sessions
            .iter()
            .filter(|(_, s)| s.alive)
            .map(|(name, s)| SessionInfo { name: name.clone(), created_at_ms: s.created_at_ms })
            .collect())
    }

    async fn kill(&self, name: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        if let Some(session) = inner.sessions.get_mut(name) {
            session.alive = false;
        }
        inner.calls.push(RecordedCall::Kill { name: name.to_string() });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
