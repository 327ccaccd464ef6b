// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive cleanup [--dry-run --force --worktrees --locks --sessions
//! --assignments]` (spec.md §6, §4.3.8): the explicit confirmation gate the
//! tick loop's own orphan-detection check refuses to act without. With no
//! category flags, all four are selected; `--dry-run` reports without
//! touching anything; otherwise `--force` is required to actually remove
//! (a bare `hive cleanup` without either flag just re-prints the report).

use hive_daemon::checks::orphan_cleanup::{self, CleanupSelection};

use crate::context;
use crate::exit_error::ExitError;

#[allow(clippy::too_many_arguments)]
pub async fn run(dry_run: bool, force: bool, worktrees: bool, locks: bool, sessions: bool, assignments: bool) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let daemon_config = hive_daemon::DaemonConfig::load(ctx.hive_dir.clone());

    let any_category = worktrees || locks || sessions || assignments;
    let selection = if any_category {
        CleanupSelection { worktrees, locks, sessions, assignments }
    } else {
        CleanupSelection::all()
    };

    let report = orphan_cleanup::scan(&ctx.store, &ctx.effects, &ctx.config, &ctx.clock, &daemon_config).await.map_err(ExitError::from)?;

    if report.is_empty() {
        println!("{}", crate::color::good("nothing to clean up"));
        return Ok(());
    }

    print_report(&report, &selection);

    if dry_run {
        return Ok(());
    }
    if !force {
        println!("\n{} pass --force to remove the above", crate::color::context("dry run:"));
        return Ok(());
    }

    let now = ctx.now_ms();
    let outcome = orphan_cleanup::apply(&ctx.store, &ctx.effects, &report, selection, now).await.map_err(ExitError::from)?;
    for line in &outcome.lines {
        println!("{} {line}", crate::color::good("done:"));
    }
    for error in &outcome.errors {
        println!("{} {error}", crate::color::bad("error:"));
    }
    Ok(())
}

fn print_report(report: &orphan_cleanup::OrphanReport, selection: &CleanupSelection) {
    println!("{}", crate::color::header("Cleanup report"));
    if selection.worktrees && !report.orphaned_worktrees.is_empty() {
        println!("  orphaned worktrees:");
        for path in &report.orphaned_worktrees {
            println!("    {}", path.display());
        }
    }
    if selection.locks && !report.stale_locks.is_empty() {
        println!("  stale locks:");
        for path in &report.stale_locks {
            println!("    {}", path.display());
        }
    }
    if selection.sessions && !report.orphaned_sessions.is_empty() {
        println!("  orphaned sessions:");
        for name in &report.orphaned_sessions {
            println!("    {name}");
        }
    }
    if selection.assignments && !report.dangling_assignments.is_empty() {
        println!("  dangling assignments:");
        for story_id in &report.dangling_assignments {
            println!("    {story_id}");
        }
    }
}
