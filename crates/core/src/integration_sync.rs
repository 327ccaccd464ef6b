// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IntegrationSync: uniqueness-enforced record linking a local entity to an
//! external provider identity. One row per `(entity_type, entity_id, provider)`.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for an integration-sync row.
    pub struct IntegrationSyncId("isy-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Requirement,
    Story,
}

crate::simple_display! {
    EntityType {
        Requirement => "requirement",
        Story => "story",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationSync {
    pub id: IntegrationSyncId,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub provider: String,
    pub external_id: String,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl IntegrationSync {
    /// The uniqueness key enforced by the store: `(entity_type, entity_id, provider)`.
    pub fn key(&self) -> (EntityType, &str, &str) {
        (self.entity_type, self.entity_id.as_str(), self.provider.as_str())
    }
}

crate::builder! {
    pub struct IntegrationSyncBuilder => IntegrationSync {
        into {
            entity_id: String = "story-placeholder",
            provider: String = "jira",
            external_id: String = "PROJ-1",
        }
        set {
            entity_type: EntityType = EntityType::Story,
        }
        computed {
            id: IntegrationSyncId = IntegrationSyncId::new(),
            created_at_ms: u64 = 0,
            updated_at_ms: u64 = 0,
        }
    }
}

#[cfg(test)]
#[path = "integration_sync_tests.rs"]
mod tests;
