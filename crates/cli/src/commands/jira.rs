// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive jira search|get|comment` — the Jira-named alias for
//! [`crate::commands::pm`]. spec.md §4.6's PM method list is Jira-shaped
//! (`transitionStory`, `postSignOffReport`, board-poll sync events), so
//! operators who only ever talk to Jira get a command named the way they
//! think about it; the two aliases dispatch through the same connector.

use crate::exit_error::ExitError;

pub async fn search(project_key: String, query: String) -> Result<(), ExitError> {
    crate::commands::pm::search(project_key, query).await
}

pub async fn get(issue_key: String) -> Result<(), ExitError> {
    crate::commands::pm::get(issue_key).await
}

pub async fn comment(issue_key: String, event: String, context_text: String) -> Result<(), ExitError> {
    crate::commands::pm::comment(issue_key, event, context_text).await
}
