// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive auth [--provider <name>]` (spec.md §6, §9): provider registration
//! is by name only — actual OAuth/token exchange with a PM or VCS host is
//! explicitly out of scope (spec.md §1 Non-goals) and is expected to have
//! happened already via the provider's own CLI (`gh auth login`, etc.) or
//! via `HIVE_PM_TOKEN`/`HIVE_PM_BASE_URL` in the environment. This command
//! only records which provider name the core should dispatch to.

use crate::context;
use crate::exit_error::ExitError;

pub fn run(provider: Option<String>) -> Result<(), ExitError> {
    let ctx = context::open()?;

    let Some(provider) = provider else {
        println!("{}", crate::color::header("Configured providers"));
        println!("  pm:  {}", display_or_none(&ctx.config.providers.pm_provider));
        println!("  vcs: {}", display_or_none(&ctx.config.providers.vcs_provider));
        return Ok(());
    };

    let mut config = ctx.config;
    match provider.as_str() {
        "github" | "gh" => config.providers.vcs_provider = provider.clone(),
        "jira" | "http" => config.providers.pm_provider = provider.clone(),
        "none" => {
            config.providers.pm_provider.clear();
            config.providers.vcs_provider.clear();
        }
        other => return Err(ExitError::user(format!("unrecognized provider \"{other}\" (expected github, jira, or none)"))),
    }

    let toml = toml::to_string_pretty(&config).map_err(|e| ExitError::internal(format!("failed to serialize config: {e}")))?;
    std::fs::write(ctx.hive_dir.join("hive.toml"), toml)
        .map_err(|e| ExitError::internal(format!("failed to write hive.toml: {e}")))?;

    println!("{} {provider}", crate::color::header("Registered provider"));
    Ok(())
}

fn display_or_none(value: &str) -> &str {
    if value.is_empty() {
        "(none)"
    } else {
        value
    }
}
