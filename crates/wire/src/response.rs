// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Responses the daemon sends back over the control socket.

use serde::{Deserialize, Serialize};

/// A short coloured-summary-per-tick rollup (spec.md §7: "the daemon prints
/// a short coloured summary per tick"), kept for `hive manager status` to
/// display without re-deriving it from the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    pub tick_number: u64,
    pub started_at_ms: u64,
    pub duration_ms: u64,
    /// One line per check that took action this tick, e.g.
    /// `"stuck_nudge: nudged 2 sessions"`.
    pub check_lines: Vec<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Pong,

    Status {
        pid: u32,
        uptime_secs: u64,
        last_tick: Option<TickSummary>,
        alive_agent_count: usize,
        pending_escalation_count: usize,
        merge_queue_depth: usize,
    },

    ShuttingDown,

    Error { message: String },
}
