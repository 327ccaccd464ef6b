// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive manager start|stop|status [--verbose]` (spec.md §6): control the
//! Manager Daemon. `start` spawns the `hived` binary detached from the
//! current terminal and confirms it came up by pinging the control socket;
//! `stop`/`status` are thin clients over the same socket, since that is the
//! only channel that reaches a daemon process this invocation didn't spawn.

use std::process::Stdio;
use std::time::Duration;

use hive_daemon::{env, socket, DaemonConfig};
use hive_wire::{Request, Response};

use crate::exit_error::ExitError;

fn daemon_config() -> Result<DaemonConfig, ExitError> {
    Ok(DaemonConfig::load(env::hive_dir()?))
}

/// `hive manager start` — no-op (with a warning) if a daemon already answers.
pub async fn start() -> Result<(), ExitError> {
    let daemon_config = daemon_config()?;

    if ping(&daemon_config.socket_path).await {
        println!("{}", crate::color::context("manager already running"));
        return Ok(());
    }

    let hived_path = sibling_binary("hived")?;
    std::fs::create_dir_all(&daemon_config.log_dir).map_err(|e| ExitError::internal(format!("failed to create log dir: {e}")))?;

    std::process::Command::new(&hived_path)
        .env("HIVE_DIR", &daemon_config.hive_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ExitError::internal(format!("failed to spawn {}: {e}", hived_path.display())))?;

    for _ in 0..20 {
        if ping(&daemon_config.socket_path).await {
            println!("{} (socket {})", crate::color::header("Manager started"), daemon_config.socket_path.display());
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(150)).await;
    }

    Err(ExitError::internal("manager daemon did not come up within 3s"))
}

/// `hive manager stop` — asks the daemon to exit after its current tick.
pub async fn stop() -> Result<(), ExitError> {
    let daemon_config = daemon_config()?;
    match socket::send(&daemon_config.socket_path, &Request::Shutdown).await {
        Ok(Response::ShuttingDown) => {
            println!("{}", crate::color::header("Manager stopping"));
            Ok(())
        }
        Ok(other) => Err(ExitError::internal(format!("unexpected response to shutdown: {other:?}"))),
        Err(err) => Err(ExitError::user(format!("no running manager to stop ({err})"))),
    }
}

/// `hive manager status [--verbose]`.
pub async fn status(verbose: bool) -> Result<(), ExitError> {
    let daemon_config = daemon_config()?;
    let response = socket::send(&daemon_config.socket_path, &Request::Status)
        .await
        .map_err(|err| ExitError::user(format!("no running manager ({err})")))?;

    let Response::Status { pid, uptime_secs, last_tick, alive_agent_count, pending_escalation_count, merge_queue_depth } = response else {
        return Err(ExitError::internal(format!("unexpected response to status: {response:?}")));
    };

    println!("{} pid {pid}, up {uptime_secs}s", crate::color::header("Manager running"));
    println!("  alive agents:        {alive_agent_count}");
    println!("  pending escalations:  {pending_escalation_count}");
    println!("  merge queue depth:   {merge_queue_depth}");

    if verbose {
        match last_tick {
            Some(tick) => {
                println!("  last tick #{} ({}ms):", tick.tick_number, tick.duration_ms);
                for line in &tick.check_lines {
                    println!("    {line}");
                }
                for error in &tick.errors {
                    println!("    {} {error}", crate::color::bad("error:"));
                }
            }
            None => println!("  no tick has completed yet"),
        }
    }

    Ok(())
}

async fn ping(socket_path: &std::path::Path) -> bool {
    matches!(socket::send(socket_path, &Request::Ping).await, Ok(Response::Pong))
}

/// Locate `hived` next to the running `hive` binary — they are always
/// installed together, so there is no separate provider-style lookup.
fn sibling_binary(name: &str) -> Result<std::path::PathBuf, ExitError> {
    let current = std::env::current_exe().map_err(|e| ExitError::internal(format!("failed to resolve current executable: {e}")))?;
    let sibling = current.with_file_name(name);
    if sibling.exists() {
        return Ok(sibling);
    }
    Ok(std::path::PathBuf::from(name))
}
