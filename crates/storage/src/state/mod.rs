// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state: one `HashMap` per entity, keyed by id, plus a
//! uniqueness index for [`IntegrationSync`] keyed on its `(entity_type,
//! entity_id, provider)` tuple. All mutation goes through [`crate::Store`]'s
//! lock-guarded transactions, so concurrent readers never observe a torn
//! write.

mod helpers;

pub use helpers::find_by_prefix;

use hive_core::{
    Agent, AgentId, Escalation, EscalationId, IntegrationSync, IntegrationSyncId, LogEntry,
    LogEntryId, PullRequest, PullRequestId, Requirement, RequirementId, Story, StoryId, Team,
    TeamId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete in-memory state materialized from the store's entity tables.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    pub teams: HashMap<String, Team>,
    pub requirements: HashMap<String, Requirement>,
    pub stories: HashMap<String, Story>,
    pub agents: HashMap<String, Agent>,
    pub pull_requests: HashMap<String, PullRequest>,
    pub escalations: HashMap<String, Escalation>,
    #[serde(default)]
    pub log_entries: HashMap<String, LogEntry>,
    #[serde(default)]
    pub integration_syncs: HashMap<String, IntegrationSync>,
    /// `(entity_type, entity_id, provider)` → `IntegrationSyncId`, enforcing
    /// the one-row-per-external-identity invariant. Not persisted directly
    /// (tuple keys don't round-trip through JSON) — rebuilt from
    /// `integration_syncs` by [`Self::rebuild_integration_sync_index`] after
    /// every load.
    #[serde(skip)]
    pub integration_sync_index: HashMap<(hive_core::EntityType, String, String), IntegrationSyncId>,
}

impl MaterializedState {
    pub fn get_team(&self, id: &str) -> Option<&Team> {
        find_by_prefix(&self.teams, id)
    }

    pub fn get_requirement(&self, id: &str) -> Option<&Requirement> {
        find_by_prefix(&self.requirements, id)
    }

    pub fn get_story(&self, id: &str) -> Option<&Story> {
        find_by_prefix(&self.stories, id)
    }

    pub fn get_agent(&self, id: &str) -> Option<&Agent> {
        find_by_prefix(&self.agents, id)
    }

    pub fn get_pull_request(&self, id: &str) -> Option<&PullRequest> {
        find_by_prefix(&self.pull_requests, id)
    }

    pub fn get_escalation(&self, id: &str) -> Option<&Escalation> {
        find_by_prefix(&self.escalations, id)
    }

    pub fn stories_for_team(&self, team_id: &TeamId) -> impl Iterator<Item = &Story> {
        self.stories.values().filter(move |s| &s.team_id == team_id)
    }

    pub fn stories_for_requirement(&self, requirement_id: &RequirementId) -> impl Iterator<Item = &Story> {
        self.stories.values().filter(move |s| &s.requirement_id == requirement_id)
    }

    pub fn agents_for_team(&self, team_id: &TeamId) -> impl Iterator<Item = &Agent> {
        self.agents.values().filter(move |a| a.team_id.as_ref() == Some(team_id))
    }

    pub fn alive_agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values().filter(|a| a.is_alive())
    }

    pub fn open_pull_requests_for_team(&self, team_id: &TeamId) -> impl Iterator<Item = &PullRequest> {
        self.pull_requests.values().filter(move |pr| &pr.team_id == team_id && pr.status.is_open())
    }

    pub fn pending_escalations(&self) -> impl Iterator<Item = &Escalation> {
        self.escalations.values().filter(|e| e.status == hive_core::EscalationStatus::Pending)
    }

    pub fn upsert_team(&mut self, team: Team) {
        self.teams.insert(team.id.as_str().to_string(), team);
    }

    pub fn upsert_requirement(&mut self, requirement: Requirement) {
        self.requirements.insert(requirement.id.as_str().to_string(), requirement);
    }

    pub fn upsert_story(&mut self, story: Story) {
        self.stories.insert(story.id.as_str().to_string(), story);
    }

    pub fn upsert_agent(&mut self, agent: Agent) {
        self.agents.insert(agent.id.as_str().to_string(), agent);
    }

    pub fn upsert_pull_request(&mut self, pr: PullRequest) {
        self.pull_requests.insert(pr.id.as_str().to_string(), pr);
    }

    pub fn upsert_escalation(&mut self, escalation: Escalation) {
        self.escalations.insert(escalation.id.as_str().to_string(), escalation);
    }

    pub fn append_log_entry(&mut self, entry: LogEntry) {
        self.log_entries.insert(entry.id.as_str().to_string(), entry);
    }

    /// Insert or update an `IntegrationSync`, enforcing the uniqueness index.
    /// Returns the row that was replaced, if its key already had one.
    pub fn upsert_integration_sync(&mut self, sync: IntegrationSync) -> Option<IntegrationSync> {
        let key = (sync.key().0, sync.key().1.to_string(), sync.key().2.to_string());
        let previous_id = self.integration_sync_index.insert(key, sync.id);
        let previous = previous_id.and_then(|id| self.integration_syncs.remove(id.as_str()));
        self.integration_syncs.insert(sync.id.as_str().to_string(), sync);
        previous
    }

    pub fn remove_agent(&mut self, id: &AgentId) -> Option<Agent> {
        self.agents.remove(id.as_str())
    }

    pub fn remove_escalation(&mut self, id: &EscalationId) -> Option<Escalation> {
        self.escalations.remove(id.as_str())
    }

    pub fn remove_pull_request(&mut self, id: &PullRequestId) -> Option<PullRequest> {
        self.pull_requests.remove(id.as_str())
    }

    /// Rebuild `integration_sync_index` from `integration_syncs`. Must be
    /// called once after deserializing a snapshot, since the index itself
    /// is not persisted.
    pub fn rebuild_integration_sync_index(&mut self) {
        self.integration_sync_index.clear();
        for sync in self.integration_syncs.values() {
            let key = (sync.key().0, sync.key().1.to_string(), sync.key().2.to_string());
            self.integration_sync_index.insert(key, sync.id);
        }
    }
}

#[cfg(test)]
#[path = "../state_tests.rs"]
mod tests;
