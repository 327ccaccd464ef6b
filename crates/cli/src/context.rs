// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `withHiveContext` (spec.md §6): locates the workspace, opens the store
//! under the file lock, and hands the command a ready-to-use [`HiveContext`].
//! There is no explicit "close" step — `Store` and the advisory lock it
//! wraps are released per-transaction, not for the context's lifetime, so
//! dropping this struct at the end of `main` is always deterministic.

use std::path::PathBuf;

use hive_core::{Clock, HiveConfig, SystemClock};
use hive_engine::EffectContext;
use hive_storage::Store;

use crate::exit_error::ExitError;

pub struct HiveContext {
    pub hive_dir: PathBuf,
    pub config: HiveConfig,
    pub store: Store,
    pub effects: EffectContext,
    pub clock: SystemClock,
}

impl HiveContext {
    pub fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }
}

/// Resolve the hive directory: `HIVE_DIR` > `XDG_STATE_HOME/hive` >
/// `~/.local/state/hive` (spec.md §6).
pub fn hive_dir() -> Result<PathBuf, ExitError> {
    if let Ok(dir) = std::env::var("HIVE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("hive"));
    }
    let home = dirs::home_dir()
        .ok_or_else(|| ExitError::internal("could not determine home directory"))?;
    Ok(home.join(".local/state/hive"))
}

/// Open the workspace at `hive_dir`. Fails with a user error (exit 1) when
/// the directory hasn't been `init`-ed yet, rather than silently creating
/// one — only `hive init` is allowed to do that.
pub fn open() -> Result<HiveContext, ExitError> {
    let hive_dir = self::hive_dir()?;
    if !hive_dir.join("hive.toml").exists() && !hive_dir.join("state.zst").exists() {
        return Err(ExitError::user(format!(
            "no hive workspace at {}: run `hive init` first",
            hive_dir.display()
        )));
    }
    open_at(hive_dir)
}

/// Open (or, for `init`, prepare to create) the workspace at an explicit path.
pub fn open_at(hive_dir: PathBuf) -> Result<HiveContext, ExitError> {
    let config = HiveConfig::load(&hive_dir.join("hive.toml"))?;
    let store = Store::open(&hive_dir, &config)?;

    let sessions = crate::providers::session_adapter();
    let vcs = crate::providers::vcs_connector(&config, sessions.clone());
    let pm = crate::providers::pm_connector(&config);
    let effects = EffectContext { sessions, vcs, pm };

    Ok(HiveContext { hive_dir, config, store, effects, clock: SystemClock, })
}

/// Adapters for an `Arc<dyn SessionAdapter>`/vcs/pm triple; the cli also
/// needs these standalone outside full `HiveContext` when dispatching
/// through [`hive_engine::spawn_agent`] with a config it just wrote.
pub fn effect_context_for(config: &HiveConfig) -> EffectContext {
    let sessions = crate::providers::session_adapter();
    let vcs = crate::providers::vcs_connector(config, sessions.clone());
    let pm = crate::providers::pm_connector(config);
    EffectContext { sessions, vcs, pm }
}

/// Resolve the calling agent for the agent-facing commands (`my-stories`,
/// `progress`, `approach`, `escalate`): an explicit `--session` flag, or
/// else the `HIVE_SESSION` a worker's own launch sets in its environment
/// (spec.md §4.4).
pub fn agent_for_session(ctx: &HiveContext, session: &Option<String>) -> Result<hive_core::AgentId, ExitError> {
    let state = ctx.store.read();
    let name = match session {
        Some(name) => name.clone(),
        None => std::env::var("HIVE_SESSION")
            .map_err(|_| ExitError::user("could not determine the calling agent: pass --session or set HIVE_SESSION"))?,
    };
    state
        .agents
        .values()
        .find(|a| a.session_name.as_deref() == Some(name.as_str()))
        .map(|a| a.id.clone())
        .ok_or_else(|| ExitError::user(format!("no agent with session {name}")))
}
