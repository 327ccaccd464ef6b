// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Manager Daemon's reconciliation tick (spec.md §4.3): one pass
//! through every check, in the order spec.md lists them, each wrapped in
//! its own recovery boundary so one check's failure never stops the rest.

use std::time::Instant;

use hive_core::{Clock, HiveConfig};
use hive_engine::EffectContext;
use hive_storage::Store;
use hive_wire::TickSummary;

use crate::checks::{feature_signoff, handoff, merge_queue, orphan_cleanup, pm_sync, spin_down, stuck, CheckOutcome};
use crate::config::DaemonConfig;
use crate::memory::TickMemory;

/// Run one full tick and return the rollup the control socket reports.
///
/// `tick_number` gates bidirectional PM sync (spec.md §4.6), which only
/// runs once every `config.timing.long_poll_every_n_ticks` ticks — every
/// other check runs every tick.
#[allow(clippy::too_many_arguments)]
pub async fn run_tick(
    store: &Store,
    ctx: &EffectContext,
    config: &HiveConfig,
    daemon_config: &DaemonConfig,
    clock: &impl Clock,
    memory: &mut TickMemory,
    tick_number: u64,
) -> TickSummary {
    let started_at_ms = clock.epoch_ms();
    let started = Instant::now();

    let mut check_lines = Vec::new();
    let mut errors = Vec::new();

    run_boundary("stuck", &mut check_lines, &mut errors, stuck::run(store, ctx, config, clock, memory)).await;
    run_boundary("handoff", &mut check_lines, &mut errors, handoff::run(store, ctx, config, clock, memory)).await;
    run_boundary("spin_down", &mut check_lines, &mut errors, spin_down::run(store, ctx, config, clock)).await;
    run_boundary("merge_queue", &mut check_lines, &mut errors, merge_queue::run(store, ctx, config, clock)).await;
    run_boundary("feature_signoff", &mut check_lines, &mut errors, feature_signoff::run(store, ctx, config, clock)).await;
    run_boundary(
        "orphan_cleanup",
        &mut check_lines,
        &mut errors,
        orphan_cleanup::run(store, ctx, config, clock, daemon_config),
    )
    .await;

    let long_poll_every = config.timing.long_poll_every_n_ticks.max(1);
    if tick_number % long_poll_every == 0 {
        run_boundary("pm_sync", &mut check_lines, &mut errors, pm_sync::run(store, ctx, config, clock)).await;
    }

    TickSummary {
        tick_number,
        started_at_ms,
        duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        check_lines,
        errors,
    }
}

/// Flatten one check's outcome (or its own propagated error) into the
/// tick's combined line/error lists without letting either abort the loop.
async fn run_boundary(
    name: &str,
    check_lines: &mut Vec<String>,
    errors: &mut Vec<String>,
    fut: impl std::future::Future<Output = crate::error::Result<CheckOutcome>>,
) {
    match fut.await {
        Ok(outcome) => {
            check_lines.extend(outcome.lines);
            errors.extend(outcome.errors);
        }
        Err(err) => {
            tracing::error!(check = name, error = %err, "tick check failed");
            errors.push(format!("{name}: {err}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_adapters::connectors::{FakePmConnector, FakeVcsConnector};
    use hive_adapters::FakeSessionAdapter;
    use hive_core::FakeClock;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn an_empty_store_produces_a_clean_tick() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path(), &HiveConfig::default()).unwrap();
        let ctx = EffectContext {
            sessions: Arc::new(FakeSessionAdapter::new()),
            vcs: Arc::new(FakeVcsConnector::new()),
            pm: Arc::new(FakePmConnector::new()),
        };
        let config = HiveConfig::default();
        let daemon_config = DaemonConfig::load(dir.path().to_path_buf());
        let clock = FakeClock::new();
        let mut memory = TickMemory::new();

        let summary = run_tick(&store, &ctx, &config, &daemon_config, &clock, &mut memory, 1).await;
        assert!(summary.errors.is_empty());
    }

    #[tokio::test]
    async fn pm_sync_only_runs_on_the_configured_tick_multiple() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path(), &HiveConfig::default()).unwrap();
        let ctx = EffectContext {
            sessions: Arc::new(FakeSessionAdapter::new()),
            vcs: Arc::new(FakeVcsConnector::new()),
            pm: Arc::new(FakePmConnector::new()),
        };
        let mut config = HiveConfig::default();
        config.timing.long_poll_every_n_ticks = 3;
        let daemon_config = DaemonConfig::load(dir.path().to_path_buf());
        let clock = FakeClock::new();
        let mut memory = TickMemory::new();

        for tick_number in 1..3 {
            let summary = run_tick(&store, &ctx, &config, &daemon_config, &clock, &mut memory, tick_number).await;
            assert!(summary.errors.is_empty());
        }
    }
}
