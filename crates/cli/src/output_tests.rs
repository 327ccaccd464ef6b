// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn handle_list_reports_the_empty_message_for_an_empty_slice() {
    let items: Vec<u32> = Vec::new();
    handle_list(OutputFormat::Text, &items, "no stories", |_| panic!("should not render")).unwrap();
}

#[test]
fn handle_list_invokes_render_text_for_a_nonempty_slice() {
    let mut rendered = false;
    handle_list(OutputFormat::Text, &[1, 2, 3], "empty", |items| {
        rendered = true;
        assert_eq!(items.len(), 3);
    })
    .unwrap();
    assert!(rendered);
}

#[test]
fn format_or_json_emits_valid_json_in_json_mode() {
    format_or_json(OutputFormat::Json, &serde_json::json!({"a": 1}), || panic!("should not render text")).unwrap();
}
