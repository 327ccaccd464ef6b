// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive.toml`: the hive directory's configuration file. Loading is
//! idempotent and every field has a default, so a partially-specified (or
//! entirely absent) file still produces a usable [`HiveConfig`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::agent::CliFlavor;
use crate::error::{HiveError, Result};

/// Per-role team capacity defaults, overridable per team at `add-repo` time
/// (spec.md §4.2: `junior_max`, `intermediate_max`, `senior_max`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamCapsConfig {
    pub junior_max: u32,
    pub intermediate_max: u32,
    pub senior_max: u32,
    pub qa_max: u32,
}

impl Default for TeamCapsConfig {
    fn default() -> Self {
        Self { junior_max: 3, intermediate_max: 2, senior_max: 1, qa_max: 1 }
    }
}

/// Polling intervals and staleness/cooldown thresholds for the Manager
/// Daemon's tick loop (spec.md §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// How often the Manager Daemon wakes to run its tick (spec.md §4.3).
    pub fast_poll_interval_ms: u64,
    /// How often bidirectional PM sync runs, in ticks (spec.md §4.6).
    pub long_poll_every_n_ticks: u64,
    /// Age past which an agent's `last_seen` marks it unresponsive (§4.3.1).
    pub stale_threshold_ms: u64,
    /// Minimum gap between nudges to the same session (§4.3.2a).
    pub nudge_cooldown_ms: u64,
    /// Unchanged-output window before `IDLE_AT_PROMPT`/`UNKNOWN` is nudged (§4.3.2/§4.3.2b).
    pub static_inactivity_threshold_ms: u64,
    /// Window past which an `estimated` story not yet `planned` is considered
    /// stuck in planning handoff (§4.3.3).
    pub stuck_threshold_ms: u64,
    /// Delay before the manager itself promotes a stalled planning handoff
    /// after a repeated detection with the same signature (§4.3.3).
    pub proactive_handoff_retry_delay_ms: u64,
    /// Pause between the "congratulations, spinning down" message and
    /// killing the session (§4.3.4).
    pub spin_down_drain_ms: u64,
    /// Fallback pause used when a `RATE_LIMITED` backoff can't be parsed
    /// from visible output (§4.3.2).
    pub rate_limit_fallback_pause_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fast_poll_interval_ms: 5_000,
            long_poll_every_n_ticks: 12,
            stale_threshold_ms: 120_000,
            nudge_cooldown_ms: 60_000,
            static_inactivity_threshold_ms: 180_000,
            stuck_threshold_ms: 600_000,
            proactive_handoff_retry_delay_ms: 300_000,
            spin_down_drain_ms: 5_000,
            rate_limit_fallback_pause_ms: 60_000,
        }
    }
}

/// Cross-process advisory lock behaviour for `hive-storage` (spec.md §5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    pub acquire_timeout_ms: u64,
    pub retry_backoff_ms: u64,
    pub stale_lock_threshold_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            acquire_timeout_ms: 5_000,
            retry_backoff_ms: 50,
            stale_lock_threshold_ms: 120_000,
        }
    }
}

/// Which PM and VCS connector implementations to load (§4.6). An empty
/// string means "none configured"; the core degrades silently rather than
/// erroring when a connector call is attempted with nothing registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub pm_provider: String,
    pub vcs_provider: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self { pm_provider: String::new(), vcs_provider: String::new() }
    }
}

/// The shell command used to launch each CLI flavour's subprocess, plus any
/// extra argv appended after the role-specific first prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliCommandConfig {
    pub command: String,
    pub extra_args: Vec<String>,
}

fn default_cli_commands() -> BTreeMap<String, CliCommandConfig> {
    let mut map = BTreeMap::new();
    map.insert(
        CliFlavor::Claude.to_string(),
        CliCommandConfig { command: "claude".into(), extra_args: Vec::new() },
    );
    map.insert(
        CliFlavor::Codex.to_string(),
        CliCommandConfig { command: "codex".into(), extra_args: Vec::new() },
    );
    map.insert(
        CliFlavor::Gemini.to_string(),
        CliCommandConfig { command: "gemini".into(), extra_args: Vec::new() },
    );
    map
}

/// Top-level configuration loaded from `hive.toml` at the hive directory root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HiveConfig {
    pub team_caps: TeamCapsConfig,
    pub timing: TimingConfig,
    pub lock: LockConfig,
    pub providers: ProvidersConfig,
    pub cli_commands: BTreeMap<String, CliCommandConfig>,
    /// Forces the premium model tier regardless of role (spec.md §3, "godmode").
    pub godmode: bool,
}

impl Default for HiveConfig {
    fn default() -> Self {
        Self {
            team_caps: TeamCapsConfig::default(),
            timing: TimingConfig::default(),
            lock: LockConfig::default(),
            providers: ProvidersConfig::default(),
            cli_commands: default_cli_commands(),
            godmode: false,
        }
    }
}

impl HiveConfig {
    /// Load from `path`, filling in defaults for any key the file omits. A
    /// missing file is not an error — it is treated as an empty document.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(HiveError::internal(format!(
                    "failed to read {}: {err}",
                    path.display()
                )));
            }
        };
        Self::parse(&contents)
    }

    /// Parse a `hive.toml` document already read into memory.
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|err| HiveError::invalid_state(format!("invalid hive.toml: {err}")))
    }

    /// Command + extra args for a given CLI flavour, falling back to the
    /// flavour's bare name if the operator didn't override it.
    pub fn cli_command(&self, flavor: CliFlavor) -> CliCommandConfig {
        self.cli_commands.get(&flavor.to_string()).cloned().unwrap_or_else(|| CliCommandConfig {
            command: flavor.to_string(),
            extra_args: Vec::new(),
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
