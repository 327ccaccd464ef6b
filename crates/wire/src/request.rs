// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Requests the `hive manager` subcommands send to a running daemon.

use serde::{Deserialize, Serialize};

/// Request from CLI to daemon over the control socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Liveness probe (`hive manager status`'s first step).
    Ping,

    /// Full status rollup (`hive manager status --verbose`).
    Status,

    /// Ask the daemon to exit after finishing its current tick
    /// (`hive manager stop`).
    Shutdown,
}
