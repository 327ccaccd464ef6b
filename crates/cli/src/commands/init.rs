// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive init` (spec.md §6): create the workspace directory layout — a
//! configuration file, the state store, an agent-memory subdirectory, a
//! logs subdirectory, and a repositories root.

use hive_core::HiveConfig;

use crate::context;
use crate::exit_error::ExitError;

pub fn run(force: bool) -> Result<(), ExitError> {
    let hive_dir = context::hive_dir()?;
    let config_path = hive_dir.join("hive.toml");

    if config_path.exists() && !force {
        return Err(ExitError::user(format!(
            "workspace already exists at {} (use --force to reinitialize)",
            hive_dir.display()
        )));
    }

    for sub in ["agents", "logs", "repos"] {
        std::fs::create_dir_all(hive_dir.join(sub))
            .map_err(|e| ExitError::internal(format!("failed to create {sub}/: {e}")))?;
    }

    let config = HiveConfig::default();
    let toml = toml::to_string_pretty(&config)
        .map_err(|e| ExitError::internal(format!("failed to serialize default config: {e}")))?;
    std::fs::write(&config_path, toml)
        .map_err(|e| ExitError::internal(format!("failed to write {}: {e}", config_path.display())))?;

    // A no-op transaction forces an empty `state.zst` to exist on disk.
    let ctx = context::open_at(hive_dir.clone())?;
    ctx.store.with_transaction(|_| Ok(()))?;

    println!("{} {}", crate::color::header("Initialized hive workspace at"), hive_dir.display());
    Ok(())
}
