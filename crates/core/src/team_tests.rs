// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::agent::RoleType;

#[test]
fn max_for_routes_to_the_right_cap() {
    let team = Team::builder().junior_max(3).senior_max(1).build();
    assert_eq!(team.max_for(RoleType::Junior), Some(3));
    assert_eq!(team.max_for(RoleType::Senior), Some(1));
}

#[test]
fn max_for_tech_lead_and_feature_test_are_uncapped() {
    let team = Team::builder().build();
    assert_eq!(team.max_for(RoleType::TechLead), None);
    assert_eq!(team.max_for(RoleType::FeatureTest), None);
}

#[test]
fn builder_produces_distinct_ids() {
    let a = Team::builder().build();
    let b = Team::builder().build();
    assert_ne!(a.id, b.id);
}
