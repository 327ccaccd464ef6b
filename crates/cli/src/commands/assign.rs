// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive assign [--dry-run]` (spec.md §6): run the Scheduler's three passes
//! by hand rather than waiting for the Manager Daemon's next tick.

use hive_core::StoryStatus;
use hive_engine::scheduler;

use crate::context;
use crate::exit_error::ExitError;

pub async fn run(dry_run: bool) -> Result<(), ExitError> {
    let ctx = context::open()?;

    if dry_run {
        let snapshot = ctx.store.read();
        let eligible = snapshot
            .stories
            .values()
            .filter(|s| {
                s.status == StoryStatus::Planned
                    && s.assigned_agent_id.is_none()
                    && s.dependencies_satisfied(|dep| {
                        snapshot.get_story(dep.as_str()).map(|d| d.status == StoryStatus::Merged).unwrap_or(false)
                    })
            })
            .count();
        println!("{} {eligible} stor{} would be assigned (dry run, no changes made)", crate::color::header("Preview:"), if eligible == 1 { "y" } else { "ies" });
        return Ok(());
    }

    let report = scheduler::assign_stories(&ctx.store, &ctx.effects, &ctx.config, &ctx.clock)
        .await
        .map_err(ExitError::from)?;
    let scaled = scheduler::check_scaling(&ctx.store, &ctx.effects, &ctx.config, &ctx.clock)
        .await
        .map_err(ExitError::from)?;
    let qa_spawned = scheduler::check_merge_queue(&ctx.store, &ctx.effects, &ctx.config, &ctx.clock)
        .await
        .map_err(ExitError::from)?;

    println!(
        "{} {} assigned, {} prevented duplicate{}, {} new worker{}, {} new qa agent{}",
        crate::color::header("Assign:"),
        report.assigned,
        report.prevented_duplicates,
        if report.prevented_duplicates == 1 { "" } else { "s" },
        scaled,
        if scaled == 1 { "" } else { "s" },
        qa_spawned,
        if qa_spawned == 1 { "" } else { "s" },
    );
    for err in &report.errors {
        crate::output::print_failure_line(err);
    }
    Ok(())
}
