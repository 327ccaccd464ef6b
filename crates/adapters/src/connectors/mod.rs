// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two narrow connector interfaces the core calls through (spec.md
//! §4.6): VCS (pull requests) and PM (epics/stories). Each has a no-op
//! "null" implementation used when no provider is configured, per spec.md:
//! "the core loads the provider named in configuration and degrades
//! silently when none is configured."

pub mod pm;
pub mod vcs;

pub use pm::{ExternalEpic, ExternalIssue, NullPmConnector, PmConnector};
pub use vcs::{NullVcsConnector, VcsConnector};

#[cfg(any(test, feature = "test-support"))]
pub use pm::FakePmConnector;
#[cfg(any(test, feature = "test-support"))]
pub use vcs::FakeVcsConnector;

/// How long a connector call is given before it is treated as a timeout.
/// Applies uniformly to subprocess (`gh`) and HTTP connector calls so a
/// hung provider can never block a reconciliation tick indefinitely
/// (spec.md §4.6: "wrapped in timeouts").
pub const CONNECTOR_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(20);
