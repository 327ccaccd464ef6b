// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive status [--json]`: a read-only rollup across teams, requirements,
//! in-flight stories, the merge queue, and pending escalations — the single
//! command an operator runs to answer "what is the hive doing right now"
//! without chasing `my-stories`/`pr queue`/`approvals list` separately.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::context;
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Serialize)]
struct StatusReport {
    teams: usize,
    open_requirements: usize,
    stories_by_status: BTreeMap<String, usize>,
    alive_agents: usize,
    merge_queue_depth: usize,
    pending_escalations: usize,
}

pub fn run(format: OutputFormat) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let state = ctx.store.read();

    let mut stories_by_status = BTreeMap::new();
    for story in state.stories.values() {
        *stories_by_status.entry(story.status.to_string()).or_insert(0usize) += 1;
    }

    let report = StatusReport {
        teams: state.teams.len(),
        open_requirements: state.requirements.values().filter(|r| !matches!(r.status, hive_core::RequirementStatus::SignOffPassed)).count(),
        stories_by_status,
        alive_agents: state.alive_agents().count(),
        merge_queue_depth: state.pull_requests.values().filter(|pr| pr.status.is_open()).count(),
        pending_escalations: state.pending_escalations().count(),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report).map_err(|e| ExitError::internal(e.to_string()))?),
        OutputFormat::Text => {
            println!("{} {}", crate::color::header("Teams:"), report.teams);
            println!("{} {}", crate::color::header("Open requirements:"), report.open_requirements);
            println!("{}", crate::color::header("Stories by status:"));
            for (status, count) in &report.stories_by_status {
                println!("  {status}: {count}");
            }
            println!("{} {}", crate::color::header("Alive agents:"), report.alive_agents);
            println!("{} {}", crate::color::header("Merge queue depth:"), report.merge_queue_depth);
            println!("{} {}", crate::color::header("Pending escalations:"), report.pending_escalations);
        }
    }
    Ok(())
}
