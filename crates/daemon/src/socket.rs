// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The control socket behind `hive manager status|stop` (spec.md §6). Unlike
//! every other surface in this crate, this is the one place the daemon talks
//! to another process directly rather than through the shared `Store` — a
//! `stop` request has to reach a specific running process, and a lockfile
//! has no way to carry that message.
//!
//! The protocol is intentionally tiny: `hive-wire`'s `Ping`/`Status`/
//! `Shutdown` over a length-prefixed JSON frame, one frame each way, one
//! connection at a time. There is no auth handshake and no TCP listener —
//! the socket file's permissions are the only access control, which is
//! sufficient for a purely local control channel (spec.md §1 Non-goals:
//! no remote management surface).

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use hive_wire::{read_message, write_message, Request, Response, TickSummary};
use parking_lot::Mutex;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Notify;

use crate::error::{DaemonError, Result};

/// The status fields the control socket reports, refreshed after every tick.
#[derive(Debug, Clone, Default)]
pub struct StatusSnapshot {
    pub last_tick: Option<TickSummary>,
    pub alive_agent_count: usize,
    pub pending_escalation_count: usize,
    pub merge_queue_depth: usize,
}

/// Shared between the tick loop (which calls [`ControlState::update`] after
/// every pass) and the accept loop (which reads it to answer `Status`).
pub struct ControlState {
    pid: u32,
    started: Instant,
    status: Mutex<StatusSnapshot>,
    shutdown_requested: AtomicBool,
    shutdown: Notify,
}

impl ControlState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            pid: std::process::id(),
            started: Instant::now(),
            status: Mutex::new(StatusSnapshot::default()),
            shutdown_requested: AtomicBool::new(false),
            shutdown: Notify::new(),
        })
    }

    pub fn update(&self, snapshot: StatusSnapshot) {
        *self.status.lock() = snapshot;
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    /// Resolves once a `Shutdown` request has been handled.
    pub async fn wait_for_shutdown(&self) {
        self.shutdown.notified().await;
    }
}

/// Bind the control socket, removing a stale file left by an unclean exit.
/// The pidfile lock (acquired before this is called) is what actually keeps
/// two daemons from running; a leftover socket inode would otherwise make
/// every subsequent `start` fail to bind.
pub fn bind(path: &Path) -> Result<UnixListener> {
    if path.exists() {
        std::fs::remove_file(path).map_err(|source| DaemonError::BindFailed { path: path.to_path_buf(), source })?;
    }
    UnixListener::bind(path).map_err(|source| DaemonError::BindFailed { path: path.to_path_buf(), source })
}

/// Accept connections until the process exits. Each connection is handled
/// to completion (one request, one response) before the next is accepted —
/// this socket only ever sees a handful of human-issued commands, never a
/// hot path worth pipelining.
pub async fn serve(listener: UnixListener, state: Arc<ControlState>) {
    loop {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(stream, &state).await {
                        tracing::warn!(error = %err, "control socket connection failed");
                    }
                });
            }
            Err(err) => tracing::error!(error = %err, "control socket accept failed"),
        }
    }
}

async fn handle_connection(mut stream: UnixStream, state: &ControlState) -> Result<()> {
    let request: Request = read_message(&mut stream).await.map_err(protocol_err)?;

    let response = match request {
        Request::Ping => Response::Pong,
        Request::Status => {
            let snapshot = state.status.lock().clone();
            Response::Status {
                pid: state.pid,
                uptime_secs: state.started.elapsed().as_secs(),
                last_tick: snapshot.last_tick,
                alive_agent_count: snapshot.alive_agent_count,
                pending_escalation_count: snapshot.pending_escalation_count,
                merge_queue_depth: snapshot.merge_queue_depth,
            }
        }
        Request::Shutdown => {
            state.shutdown_requested.store(true, Ordering::SeqCst);
            state.shutdown.notify_waiters();
            Response::ShuttingDown
        }
    };

    write_message(&mut stream, &response).await.map_err(protocol_err)
}

fn protocol_err(err: hive_wire::ProtocolError) -> DaemonError {
    DaemonError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err.to_string()))
}

/// Connect to a running daemon's control socket and send one request. Used
/// by the `hive manager status|stop` client side, which has no other way
/// to reach a process it didn't spawn.
pub async fn send(socket_path: &Path, request: &Request) -> Result<Response> {
    let mut stream = UnixStream::connect(socket_path).await.map_err(DaemonError::Io)?;
    write_message(&mut stream, request).await.map_err(protocol_err)?;
    read_message(&mut stream).await.map_err(protocol_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ping_round_trips_to_pong() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("control.sock");
        let listener = bind(&socket_path).unwrap();
        let state = ControlState::new();

        let server = tokio::spawn(serve(listener, Arc::clone(&state)));

        let response = send(&socket_path, &Request::Ping).await.unwrap();
        assert_eq!(response, Response::Pong);

        server.abort();
    }

    #[tokio::test]
    async fn status_reports_the_most_recent_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("control.sock");
        let listener = bind(&socket_path).unwrap();
        let state = ControlState::new();
        state.update(StatusSnapshot { last_tick: None, alive_agent_count: 3, pending_escalation_count: 1, merge_queue_depth: 2 });

        let server = tokio::spawn(serve(listener, Arc::clone(&state)));

        let response = send(&socket_path, &Request::Status).await.unwrap();
        match response {
            Response::Status { alive_agent_count, pending_escalation_count, merge_queue_depth, .. } => {
                assert_eq!(alive_agent_count, 3);
                assert_eq!(pending_escalation_count, 1);
                assert_eq!(merge_queue_depth, 2);
            }
            other => panic!("unexpected response: {other:?}"),
        }

        server.abort();
    }

    #[tokio::test]
    async fn shutdown_request_wakes_the_waiter() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("control.sock");
        let listener = bind(&socket_path).unwrap();
        let state = ControlState::new();

        let server = tokio::spawn(serve(listener, Arc::clone(&state)));
        let waiter_state = Arc::clone(&state);
        let waiter = tokio::spawn(async move { waiter_state.wait_for_shutdown().await });

        let response = send(&socket_path, &Request::Shutdown).await.unwrap();
        assert_eq!(response, Response::ShuttingDown);

        tokio::time::timeout(std::time::Duration::from_secs(1), waiter).await.unwrap().unwrap();
        assert!(state.shutdown_requested());

        server.abort();
    }
}
