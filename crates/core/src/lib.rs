// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hive-core: shared types for the Hive multi-agent software-delivery
//! orchestrator. Entity state machines, IDs, the Manager Daemon's `Effect`
//! enum, configuration, and the ambient clock/slug/error helpers the rest
//! of the workspace builds on.

pub mod macros;

pub mod agent;
pub mod clock;
pub mod config;
pub mod effect;
pub mod error;
pub mod escalation;
pub mod id;
pub mod integration_sync;
pub mod log_entry;
pub mod pull_request;
pub mod requirement;
pub mod slug;
pub mod story;
pub mod team;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use agent::{Agent, AgentId, AgentStatus, CliFlavor, RoleType};
#[cfg(any(test, feature = "test-support"))]
pub use agent::AgentBuilder;
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{CliCommandConfig, HiveConfig, LockConfig, ProvidersConfig, TeamCapsConfig, TimingConfig};
pub use effect::{Effect, EffectOutcome};
pub use error::{ErrorKind, HiveError, Result};
pub use escalation::{Escalation, EscalationId, EscalationStatus};
#[cfg(any(test, feature = "test-support"))]
pub use escalation::EscalationBuilder;
pub use id::{short, IdBuf, ID_MAX_LEN};
pub use integration_sync::{EntityType, IntegrationSync, IntegrationSyncId};
#[cfg(any(test, feature = "test-support"))]
pub use integration_sync::IntegrationSyncBuilder;
pub use log_entry::{EventType, LogEntry, LogEntryId};
#[cfg(any(test, feature = "test-support"))]
pub use log_entry::LogEntryBuilder;
pub use pull_request::{PrStatus, PullRequest, PullRequestId};
#[cfg(any(test, feature = "test-support"))]
pub use pull_request::PullRequestBuilder;
pub use requirement::{Requirement, RequirementId, RequirementStatus};
#[cfg(any(test, feature = "test-support"))]
pub use requirement::RequirementBuilder;
pub use slug::{slugify, team_slug};
pub use story::{PmExternalKeys, Story, StoryId, StoryStatus};
#[cfg(any(test, feature = "test-support"))]
pub use story::StoryBuilder;
pub use team::{Team, TeamId};
#[cfg(any(test, feature = "test-support"))]
pub use team::TeamBuilder;
