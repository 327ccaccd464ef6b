// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive pm search|get|comment` (spec.md §6, §4.6): a thin read/write shell
//! over the configured [`hive_adapters::connectors::pm::PmConnector`] for
//! operators and agent sessions that need to look something up without
//! going through the story/requirement pipeline. `hive jira` is the
//! Jira-flavoured alias for this same surface (spec.md's PM method list is
//! Jira-shaped; see [`crate::commands::jira`]).

use crate::context;
use crate::exit_error::ExitError;

pub async fn search(project_key: String, query: String) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let issues = ctx.effects.pm.search_issues(&project_key, &query).await.map_err(ExitError::from)?;

    if issues.is_empty() {
        println!("no issues matched");
        return Ok(());
    }
    for issue in &issues {
        println!("{}  {}  {}", crate::color::context(&issue.key), issue.status, issue.title);
    }
    Ok(())
}

pub async fn get(issue_key: String) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let issue = ctx.effects.pm.get_issue(&issue_key).await.map_err(ExitError::from)?;

    println!("{} {}", crate::color::header("Issue"), issue.key);
    println!("  title:  {}", issue.title);
    println!("  status: {}", issue.status);
    if let Some(parent) = &issue.parent_key {
        println!("  parent: {parent}");
    }
    Ok(())
}

pub async fn comment(issue_key: String, event: String, context_text: String) -> Result<(), ExitError> {
    let ctx = context::open()?;
    ctx.effects.pm.post_comment(&issue_key, &event, &context_text).await.map_err(ExitError::from)?;
    println!("{} {issue_key}", crate::color::header("Commented on"));
    Ok(())
}
