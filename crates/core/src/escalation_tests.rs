// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn no_to_agent_means_human_targeted() {
    let esc = Escalation::builder().build();
    assert!(esc.is_human_targeted());
}

#[test]
fn agent_targeted_when_to_agent_set() {
    let esc = Escalation::builder().to_agent_id(AgentId::new("senior-abc")).build();
    assert!(!esc.is_human_targeted());
}
