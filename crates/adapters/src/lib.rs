// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! hive-adapters: the narrow, swappable interfaces the core control plane
//! calls through to reach the outside world (spec.md §4.4–§4.6):
//!
//! - [`session`] — the Session Supervisor, wrapping the terminal multiplexer.
//! - [`detector`] — the State Detector, a pure classifier of session output.
//! - [`connectors`] — the VCS and PM connectors.
//!
//! None of these hold orchestration state of their own; `hive-engine` and
//! `hive-daemon` own the decisions, these crates only execute them.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod connectors;
pub mod detector;
pub mod error;
pub mod session;

pub use detector::{classify, AgentState, DetectorResult};
pub use error::AdapterError;
pub use session::{SessionAdapter, SessionInfo};

#[cfg(any(test, feature = "test-support"))]
pub use session::FakeSessionAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use connectors::{FakePmConnector, FakeVcsConnector};
