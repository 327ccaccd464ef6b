// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PM connector (spec.md §4.6): `fetchEpic`, `createEpic`, `createStory`,
//! `transitionStory`, `createSubtask`, `transitionSubtask`, `postComment`,
//! `postSignOffReport`, `searchIssues`, `getIssue`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::CONNECTOR_TIMEOUT;
use crate::error::{AdapterError, Result};

/// An external epic, as fetched or created in the configured PM provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalEpic {
    pub key: String,
    pub title: String,
    pub description: String,
}

/// An external issue (story, subtask, or any searchable item).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIssue {
    pub key: String,
    pub title: String,
    pub status: String,
    pub parent_key: Option<String>,
}

#[async_trait]
pub trait PmConnector: Send + Sync {
    async fn fetch_epic(&self, key: &str) -> Result<ExternalEpic>;

    async fn create_epic(&self, project_key: &str, title: &str, description: &str) -> Result<ExternalEpic>;

    async fn create_story(
        &self,
        project_key: &str,
        epic_key: &str,
        title: &str,
        description: &str,
    ) -> Result<ExternalIssue>;

    /// Forward-only per spec.md §4.6: `mapping` is the hive-status →
    /// provider-status table from configuration; callers are responsible
    /// for only invoking this with a forward transition.
    async fn transition_story(&self, issue_key: &str, provider_status: &str) -> Result<()>;

    async fn create_subtask(&self, parent_key: &str, title: &str) -> Result<ExternalIssue>;

    async fn transition_subtask(&self, subtask_key: &str, provider_status: &str) -> Result<()>;

    async fn post_comment(&self, issue_key: &str, event: &str, context: &str) -> Result<()>;

    async fn post_sign_off_report(&self, issue_key: &str, report: &str) -> Result<()>;

    async fn search_issues(&self, project_key: &str, jql_like_query: &str) -> Result<Vec<ExternalIssue>>;

    async fn get_issue(&self, issue_key: &str) -> Result<ExternalIssue>;
}

/// A narrow REST client implementing the Jira-shaped subset of the PM
/// connector surface. The teacher has no outbound PM-provider need of its
/// own; the HTTP-client pattern (bearer auth, `error_for_status`,
/// `.json::<T>()`) is imported from the broader example pack's HTTP
/// provider clients.
pub struct HttpPmConnector {
    base_url: String,
    auth_token: String,
    client: reqwest::Client,
}

impl HttpPmConnector {
    pub fn new(base_url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: auth_token.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .client
            .request(method, &url)
            .header("Authorization", format!("Bearer {}", self.auth_token))
            .header("Accept", "application/json");
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = tokio::time::timeout(CONNECTOR_TIMEOUT, req.send())
            .await
            .map_err(|_| AdapterError::Timeout(CONNECTOR_TIMEOUT))?
            .map_err(|e| AdapterError::ConnectorFailed(format!("{url}: {e}")))?;

        resp.error_for_status()
            .map_err(|e| AdapterError::ConnectorFailed(format!("{url} returned error status: {e}")))?
            .json::<T>()
            .await
            .map_err(|e| AdapterError::ConnectorFailed(format!("{url} bad response body: {e}")))
    }

    async fn call_no_body(&self, method: reqwest::Method, path: &str, body: Option<serde_json::Value>) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .client
            .request(method, &url)
            .header("Authorization", format!("Bearer {}", self.auth_token))
            .header("Accept", "application/json");
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = tokio::time::timeout(CONNECTOR_TIMEOUT, req.send())
            .await
            .map_err(|_| AdapterError::Timeout(CONNECTOR_TIMEOUT))?
            .map_err(|e| AdapterError::ConnectorFailed(format!("{url}: {e}")))?;
        resp.error_for_status()
            .map_err(|e| AdapterError::ConnectorFailed(format!("{url} returned error status: {e}")))?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct IssueDto {
    key: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    parent_key: Option<String>,
}

impl From<IssueDto> for ExternalIssue {
    fn from(dto: IssueDto) -> Self {
        ExternalIssue { key: dto.key, title: dto.title, status: dto.status, parent_key: dto.parent_key }
    }
}

#[derive(Deserialize)]
struct EpicDto {
    key: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

impl From<EpicDto> for ExternalEpic {
    fn from(dto: EpicDto) -> Self {
        ExternalEpic { key: dto.key, title: dto.title, description: dto.description }
    }
}

#[async_trait]
impl PmConnector for HttpPmConnector {
    async fn fetch_epic(&self, key: &str) -> Result<ExternalEpic> {
        let dto: EpicDto = self.call(reqwest::Method::GET, &format!("/issues/{key}"), None).await?;
        Ok(dto.into())
    }

    async fn create_epic(&self, project_key: &str, title: &str, description: &str) -> Result<ExternalEpic> {
        let body = serde_json::json!({
            "project_key": project_key,
            "issue_type": "Epic",
            "title": title,
            "description": description,
        });
        let dto: EpicDto = self.call(reqwest::Method::POST, "/issues", Some(body)).await?;
        Ok(dto.into())
    }

    async fn create_story(
        &self,
        project_key: &str,
        epic_key: &str,
        title: &str,
        description: &str,
    ) -> Result<ExternalIssue> {
        let body = serde_json::json!({
            "project_key": project_key,
            "issue_type": "Story",
            "parent_key": epic_key,
            "title": title,
            "description": description,
        });
        let dto: IssueDto = self.call(reqwest::Method::POST, "/issues", Some(body)).await?;
        Ok(dto.into())
    }

    async fn transition_story(&self, issue_key: &str, provider_status: &str) -> Result<()> {
        let body = serde_json::json!({ "status": provider_status });
        self.call_no_body(reqwest::Method::POST, &format!("/issues/{issue_key}/transitions"), Some(body)).await
    }

    async fn create_subtask(&self, parent_key: &str, title: &str) -> Result<ExternalIssue> {
        let body = serde_json::json!({
            "issue_type": "Subtask",
            "parent_key": parent_key,
            "title": title,
        });
        let dto: IssueDto = self.call(reqwest::Method::POST, "/issues", Some(body)).await?;
        Ok(dto.into())
    }

    async fn transition_subtask(&self, subtask_key: &str, provider_status: &str) -> Result<()> {
        self.transition_story(subtask_key, provider_status).await
    }

    async fn post_comment(&self, issue_key: &str, event: &str, context: &str) -> Result<()> {
        let body = serde_json::json!({ "body": format!("[{event}] {context}") });
        self.call_no_body(reqwest::Method::POST, &format!("/issues/{issue_key}/comments"), Some(body)).await
    }

    async fn post_sign_off_report(&self, issue_key: &str, report: &str) -> Result<()> {
        self.post_comment(issue_key, "sign_off", report).await
    }

    async fn search_issues(&self, project_key: &str, jql_like_query: &str) -> Result<Vec<ExternalIssue>> {
        let dtos: Vec<IssueDto> = self
            .call(
                reqwest::Method::GET,
                &format!("/search?project_key={project_key}&q={jql_like_query}"),
                None,
            )
            .await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn get_issue(&self, issue_key: &str) -> Result<ExternalIssue> {
        let dto: IssueDto = self.call(reqwest::Method::GET, &format!("/issues/{issue_key}"), None).await?;
        Ok(dto.into())
    }
}

/// No-op connector used when no PM provider is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPmConnector;

#[async_trait]
impl PmConnector for NullPmConnector {
    async fn fetch_epic(&self, _key: &str) -> Result<ExternalEpic> {
        Err(AdapterError::NoProviderConfigured)
    }

    async fn create_epic(&self, _project_key: &str, _title: &str, _description: &str) -> Result<ExternalEpic> {
        Err(AdapterError::NoProviderConfigured)
    }

    async fn create_story(
        &self,
        _project_key: &str,
        _epic_key: &str,
        _title: &str,
        _description: &str,
    ) -> Result<ExternalIssue> {
        Err(AdapterError::NoProviderConfigured)
    }

    async fn transition_story(&self, _issue_key: &str, _provider_status: &str) -> Result<()> {
        Ok(())
    }

    async fn create_subtask(&self, _parent_key: &str, _title: &str) -> Result<ExternalIssue> {
        Err(AdapterError::NoProviderConfigured)
    }

    async fn transition_subtask(&self, _subtask_key: &str, _provider_status: &str) -> Result<()> {
        Ok(())
    }

    async fn post_comment(&self, _issue_key: &str, _event: &str, _context: &str) -> Result<()> {
        Ok(())
    }

    async fn post_sign_off_report(&self, _issue_key: &str, _report: &str) -> Result<()> {
        Ok(())
    }

    async fn search_issues(&self, _project_key: &str, _jql_like_query: &str) -> Result<Vec<ExternalIssue>> {
        Ok(Vec::new())
    }

    async fn get_issue(&self, _issue_key: &str) -> Result<ExternalIssue> {
        Err(AdapterError::NoProviderConfigured)
    }
}

/// Test-support fake: an in-memory issue store keyed by issue key.
#[cfg(any(test, feature = "test-support"))]
#[derive(Clone, Default)]
pub struct FakePmConnector {
    inner: Arc<parking_lot::Mutex<FakePmInner>>,
}

#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
struct FakePmInner {
    epics: std::collections::HashMap<String, ExternalEpic>,
    issues: std::collections::HashMap<String, ExternalIssue>,
    comments: Vec<(String, String, String)>,
    next_id: u64,
}

#[cfg(any(test, feature = "test-support"))]
impl FakePmConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_epic(&self, epic: ExternalEpic) {
        self.inner.lock().epics.insert(epic.key.clone(), epic);
    }

    pub fn comments(&self) -> Vec<(String, String, String)> {
        self.inner.lock().comments.clone()
    }

    fn next_key(inner: &mut FakePmInner, prefix: &str) -> String {
        inner.next_id += 1;
        format!("{prefix}-{}", inner.next_id)
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl PmConnector for FakePmConnector {
    async fn fetch_epic(&self, key: &str) -> Result<ExternalEpic> {
        self.inner
            .lock()
            .epics
            .get(key)
            .cloned()
            .ok_or_else(|| AdapterError::ConnectorFailed(format!("no such epic: {key}")))
    }

    async fn create_epic(&self, _project_key: &str, title: &str, description: &str) -> Result<ExternalEpic> {
        let mut inner = self.inner.lock();
        let key = Self::next_key(&mut inner, "EPIC");
        let epic = ExternalEpic { key: key.clone(), title: title.to_string(), description: description.to_string() };
        inner.epics.insert(key, epic.clone());
        Ok(epic)
    }

    async fn create_story(
        &self,
        _project_key: &str,
        epic_key: &str,
        title: &str,
        _description: &str,
    ) -> Result<ExternalIssue> {
        let mut inner = self.inner.lock();
        let key = Self::next_key(&mut inner, "STORY");
        let issue = ExternalIssue {
            key: key.clone(),
            title: title.to_string(),
            status: "To Do".to_string(),
            parent_key: Some(epic_key.to_string()),
        };
        inner.issues.insert(key, issue.clone());
        Ok(issue)
    }

    async fn transition_story(&self, issue_key: &str, provider_status: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        if let Some(issue) = inner.issues.get_mut(issue_key) {
            issue.status = provider_status.to_string();
        }
        Ok(())
    }

    async fn create_subtask(&self, parent_key: &str, title: &str) -> Result<ExternalIssue> {
        self.create_story("", parent_key, title, "").await
    }

    async fn transition_subtask(&self, subtask_key: &str, provider_status: &str) -> Result<()> {
        self.transition_story(subtask_key, provider_status).await
    }

    async fn post_comment(&self, issue_key: &str, event: &str, context: &str) -> Result<()> {
        self.inner.lock().comments.push((issue_key.to_string(), event.to_string(), context.to_string()));
        Ok(())
    }

    async fn post_sign_off_report(&self, issue_key: &str, report: &str) -> Result<()> {
        self.post_comment(issue_key, "sign_off", report).await
    }

    async fn search_issues(&self, _project_key: &str, jql_like_query: &str) -> Result<Vec<ExternalIssue>> {
        Ok(self
            .inner
            .lock()
            .issues
            .values()
            .filter(|i| i.title.contains(jql_like_query) || jql_like_query.is_empty())
            .cloned()
            .collect())
    }

    async fn get_issue(&self, issue_key: &str) -> Result<ExternalIssue> {
        self.inner
            .lock()
            .issues
            .get(issue_key)
            .cloned()
            .ok_or_else(|| AdapterError::ConnectorFailed(format!("no such issue: {issue_key}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_connector_fetch_epic_reports_no_provider() {
        let connector = NullPmConnector;
        let err = connector.fetch_epic("EPIC-1").await.unwrap_err();
        assert!(matches!(err, AdapterError::NoProviderConfigured));
    }

    #[tokio::test]
    async fn null_connector_transitions_are_no_ops() {
        let connector = NullPmConnector;
        connector.transition_story("STORY-1", "Done").await.unwrap();
    }

    #[tokio::test]
    async fn fake_connector_round_trips_an_epic_and_story() {
        let connector = FakePmConnector::new();
        let epic = connector.create_epic("PROJ", "Epic title", "desc").await.unwrap();
        let story = connector.create_story("PROJ", &epic.key, "Story title", "desc").await.unwrap();
        assert_eq!(story.parent_key.as_deref(), Some(epic.key.as_str()));

        connector.transition_story(&story.key, "In Progress").await.unwrap();
        let fetched = connector.get_issue(&story.key).await.unwrap();
        assert_eq!(fetched.status, "In Progress");
    }

    #[tokio::test]
    async fn fake_connector_records_posted_comments() {
        let connector = FakePmConnector::new();
        connector.post_sign_off_report("STORY-1", "all green").await.unwrap();
        let comments = connector.comments();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].1, "sign_off");
    }
}
