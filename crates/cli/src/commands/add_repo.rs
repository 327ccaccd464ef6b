// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive add-repo --url --team [--branch]` (spec.md §6): register a team
//! (repository). A `Team` is created once and never mutated again except
//! for its per-role worker caps.

use std::path::PathBuf;

use hive_core::{slugify, Team, TeamId};

use crate::context;
use crate::exit_error::ExitError;

pub fn run(url: String, team_name: String, _branch: Option<String>) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let now = ctx.now_ms();

    let existing_name_conflict =
        ctx.store.read().teams.values().any(|t| t.display_name.eq_ignore_ascii_case(&team_name));
    if existing_name_conflict {
        return Err(ExitError::user(format!("a team named \"{team_name}\" already exists")));
    }

    let repo_path = PathBuf::from(slugify(&team_name, 48));
    let caps = ctx.config.team_caps;
    let team = Team {
        id: TeamId::new(),
        display_name: team_name.clone(),
        repo_url: url,
        repo_path,
        junior_max: caps.junior_max,
        intermediate_max: caps.intermediate_max,
        senior_max: caps.senior_max,
        qa_max: caps.qa_max,
        created_at_ms: now,
        updated_at_ms: now,
    };

    ctx.store.with_transaction(|state| {
        state.upsert_team(team.clone());
        Ok(())
    })?;

    println!(
        "{} {} ({})",
        crate::color::header("Registered team"),
        team_name,
        crate::color::context(team.id.as_str())
    );
    Ok(())
}
