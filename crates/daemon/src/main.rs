// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hived`: the Manager Daemon binary (spec.md §4.3). `hive manager start`
//! spawns this as a detached process; everything it does is reconciliation
//! against the shared `Store` plus the liveness/status surface served over
//! the control socket. There is no other entry point into this crate's tick
//! loop — tests drive [`hive_daemon::run_tick`] directly instead.

use std::sync::Arc;
use std::time::Duration;

use hive_adapters::connectors::{HttpPmConnector, NullPmConnector, NullVcsConnector, PmConnector, VcsConnector};
use hive_adapters::session::{SessionAdapter, TmuxSessionAdapter};
use hive_core::HiveConfig;
use hive_daemon::socket::{self, ControlState, StatusSnapshot};
use hive_daemon::{env, pidfile, run_tick, DaemonConfig, TickMemory};
use hive_engine::EffectContext;
use hive_storage::Store;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("hived: {err}");
        std::process::exit(2);
    }
}

async fn run() -> hive_daemon::Result<()> {
    let hive_dir = env::hive_dir()?;
    let daemon_config = DaemonConfig::load(hive_dir);
    std::fs::create_dir_all(&daemon_config.log_dir)?;

    let _log_guard = init_logging(&daemon_config);
    tracing::info!(hive_dir = %daemon_config.hive_dir.display(), "starting manager daemon");

    let _pid_lock = pidfile::acquire(&daemon_config.pid_path)?;

    let config = HiveConfig::load(&daemon_config.config_path)?;
    let store = Store::open(&daemon_config.hive_dir, &config)?;
    let effects = build_effects(&config);

    let listener = socket::bind(&daemon_config.socket_path)?;
    let control_state = ControlState::new();
    tokio::spawn(socket::serve(listener, Arc::clone(&control_state)));

    let clock = hive_core::SystemClock;
    let mut memory = TickMemory::new();
    let mut tick_number: u64 = 0;
    let interval = Duration::from_millis(config.timing.fast_poll_interval_ms.max(1));

    loop {
        tick_number += 1;
        let summary = run_tick(&store, &effects, &config, &daemon_config, &clock, &mut memory, tick_number).await;

        for line in &summary.check_lines {
            tracing::info!(tick = tick_number, "{line}");
        }
        for error in &summary.errors {
            tracing::warn!(tick = tick_number, "{error}");
        }

        let state = store.read();
        control_state.update(StatusSnapshot {
            last_tick: Some(summary),
            alive_agent_count: state.alive_agents().count(),
            pending_escalation_count: state.pending_escalations().count(),
            merge_queue_depth: state.pull_requests.values().filter(|pr| pr.status.is_open()).count(),
        });
        drop(state);

        if control_state.shutdown_requested() {
            tracing::info!("shutdown requested over control socket, exiting after this tick");
            break;
        }

        tokio::time::sleep(interval).await;
    }

    Ok(())
}

fn init_logging(daemon_config: &DaemonConfig) -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(&daemon_config.log_dir, "hived.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt().with_env_filter(EnvFilter::new(env::log_filter())).with_writer(non_blocking).with_ansi(false).init();
    guard
}

/// Build the same connector triple `hive-cli` builds (spec.md §4.6: "the
/// core never imports provider code directly") — the daemon is a second
/// process wiring the same closed set of provider names, not a client of
/// the CLI crate.
fn build_effects(config: &HiveConfig) -> EffectContext {
    let sessions: Arc<dyn SessionAdapter> = Arc::new(TmuxSessionAdapter::default());

    let vcs: Arc<dyn VcsConnector> = match config.providers.vcs_provider.as_str() {
        "github" | "gh" => Arc::new(hive_adapters::connectors::vcs::GitHostCliVcsConnector::new(Arc::clone(&sessions))),
        _ => Arc::new(NullVcsConnector),
    };

    let pm: Arc<dyn PmConnector> = match config.providers.pm_provider.as_str() {
        "jira" | "http" => {
            let base_url = std::env::var("HIVE_PM_BASE_URL").unwrap_or_default();
            let token = std::env::var("HIVE_PM_TOKEN").unwrap_or_default();
            if base_url.is_empty() {
                Arc::new(NullPmConnector)
            } else {
                Arc::new(HttpPmConnector::new(base_url, token))
            }
        }
        _ => Arc::new(NullPmConnector),
    };

    EffectContext { sessions, vcs, pm }
}
