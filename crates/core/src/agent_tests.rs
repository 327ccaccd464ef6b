// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn routing_table_matches_spec_boundaries() {
    assert_eq!(RoleType::for_complexity(1), RoleType::Junior);
    assert_eq!(RoleType::for_complexity(3), RoleType::Junior);
    assert_eq!(RoleType::for_complexity(4), RoleType::Intermediate);
    assert_eq!(RoleType::for_complexity(5), RoleType::Intermediate);
    assert_eq!(RoleType::for_complexity(6), RoleType::Senior);
    assert_eq!(RoleType::for_complexity(13), RoleType::Senior);
}

#[test]
fn higher_role_may_absorb_a_lower_targets_story() {
    assert!(RoleType::Senior.may_absorb(RoleType::Junior));
    assert!(RoleType::Intermediate.may_absorb(RoleType::Junior));
}

#[test]
fn lower_role_may_not_absorb_a_higher_targets_story() {
    assert!(!RoleType::Junior.may_absorb(RoleType::Senior));
    assert!(!RoleType::Junior.may_absorb(RoleType::Intermediate));
}

#[test]
fn same_role_may_absorb_its_own_target() {
    assert!(RoleType::Senior.may_absorb(RoleType::Senior));
}

#[test]
fn agent_id_carries_role_prefix() {
    let id = AgentId::generate(RoleType::Senior);
    assert!(id.as_str().starts_with("senior-"));
}

#[test]
fn is_alive_false_only_when_terminated() {
    let agent = Agent::builder().status(AgentStatus::Blocked).build();
    assert!(agent.is_alive());
    let agent = Agent::builder().status(AgentStatus::Terminated).build();
    assert!(!agent.is_alive());
}

#[test]
fn role_display_is_snake_case() {
    assert_eq!(RoleType::TechLead.to_string(), "tech_lead");
    assert_eq!(RoleType::FeatureTest.to_string(), "feature_test");
}
