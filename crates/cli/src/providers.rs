// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider loading (spec.md §4.6, §9: "provider registration is by name;
//! the core never imports provider code directly"). The CLI is the one
//! place that knows the closed set of provider name strings and maps them
//! to a concrete connector; everything downstream only sees the trait
//! object.

use std::sync::Arc;

use hive_adapters::connectors::{HttpPmConnector, NullPmConnector, NullVcsConnector, PmConnector, VcsConnector};
use hive_adapters::session::{SessionAdapter, TmuxSessionAdapter};
use hive_core::HiveConfig;

/// Build the VCS connector named in `config.providers.vcs_provider`,
/// degrading silently to [`NullVcsConnector`] when unset or unrecognized.
pub fn vcs_connector(config: &HiveConfig, sessions: Arc<dyn SessionAdapter>) -> Arc<dyn VcsConnector> {
    match config.providers.vcs_provider.as_str() {
        "github" | "gh" => Arc::new(hive_adapters::connectors::vcs::GitHostCliVcsConnector::new(sessions)),
        _ => Arc::new(NullVcsConnector),
    }
}

/// Build the PM connector named in `config.providers.pm_provider`, reading
/// its base URL and auth token from the environment (`HIVE_PM_BASE_URL`,
/// `HIVE_PM_TOKEN`). OAuth token acquisition itself is out of scope (spec.md
/// §1); this only consumes whatever credential is already on disk/env.
pub fn pm_connector(config: &HiveConfig) -> Arc<dyn PmConnector> {
    match config.providers.pm_provider.as_str() {
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
    }
}

/// The Session Supervisor is always the real terminal-multiplexer adapter
/// outside of tests — there is no "null" session backend, since every
/// agent is a subprocess-backed session (spec.md §4.4).
pub fn session_adapter() -> Arc<dyn SessionAdapter> {
    Arc::new(TmuxSessionAdapter::default())
}
