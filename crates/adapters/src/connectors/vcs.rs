// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! VCS connector (spec.md §4.6): `submitPR`, `approvePR`, `mergePR`,
//! `listOpenPRs`, `createBranch`, `notifyReviewer`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use super::CONNECTOR_TIMEOUT;
use crate::error::{AdapterError, Result};
use crate::session::SessionAdapter;

/// A pull request as reported by the remote host, independent of the local
/// `PullRequest` entity (which may not yet know the external number/URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalPr {
    pub number: u64,
    pub url: String,
    pub branch_name: String,
}

#[async_trait]
pub trait VcsConnector: Send + Sync {
    async fn submit_pr(
        &self,
        repo_path: &Path,
        branch_name: &str,
        title: &str,
        body: &str,
    ) -> Result<ExternalPr>;

    async fn approve_pr(&self, repo_path: &Path, pr_number: u64) -> Result<()>;

    async fn merge_pr(
        &self,
        repo_path: &Path,
        pr_number: u64,
        squash: bool,
        delete_branch: bool,
    ) -> Result<()>;

    async fn list_open_prs(&self, repo_path: &Path) -> Result<Vec<ExternalPr>>;

    async fn create_branch(&self, repo_path: &Path, branch_name: &str, base: &str) -> Result<()>;

    /// Delegates to the Session Supervisor: this is a message to a live
    /// agent session, not a VCS host API call.
    async fn notify_reviewer(&self, session: &str, text: &str) -> Result<()>;
}

/// Shells out to the `gh` CLI, same subprocess style as the Session
/// Supervisor's tmux calls. `notifyReviewer` delegates to the Session
/// Supervisor rather than the host API, since it is really a tmux message.
pub struct GitHostCliVcsConnector {
    sessions: Arc<dyn SessionAdapter>,
}

impl GitHostCliVcsConnector {
    pub fn new(sessions: Arc<dyn SessionAdapter>) -> Self {
        Self { sessions }
    }

    async fn run(&self, repo_path: &Path, args: &[&str]) -> Result<String> {
        let output = tokio::time::timeout(
            CONNECTOR_TIMEOUT,
            Command::new("gh")
                .args(args)
                .current_dir(repo_path)
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output(),
        )
        .await
        .map_err(|_| AdapterError::Timeout(CONNECTOR_TIMEOUT))?
        .map_err(|e| AdapterError::ConnectorFailed(format!("gh {args:?}: {e}")))?;

        if !output.status.success() {
            return Err(AdapterError::ConnectorFailed(format!(
                "gh {args:?} failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl VcsConnector for GitHostCliVcsConnector {
    async fn submit_pr(
        &self,
        repo_path: &Path,
        branch_name: &str,
        title: &str,
        body: &str,
    ) -> Result<ExternalPr> {
        let url = self
            .run(
                repo_path,
                &["pr", "create", "--head", branch_name, "--title", title, "--body", body],
            )
            .await?;
        let number = parse_pr_number(&url)
            .ok_or_else(|| AdapterError::ConnectorFailed(format!("could not parse PR number from {url}")))?;
        Ok(ExternalPr { number, url, branch_name: branch_name.to_string() })
    }

    async fn approve_pr(&self, repo_path: &Path, pr_number: u64) -> Result<()> {
        self.run(repo_path, &["pr", "review", &pr_number.to_string(), "--approve"]).await?;
        Ok(())
    }

    async fn merge_pr(
        &self,
        repo_path: &Path,
        pr_number: u64,
        squash: bool,
        delete_branch: bool,
    ) -> Result<()> {
        let pr_number = pr_number.to_string();
        let mut args = vec!["pr", "merge", pr_number.as_str()];
        args.push(if squash { "--squash" } else { "--merge" });
        if delete_branch {
            args.push("--delete-branch");
        }
        self.run(repo_path, &args).await?;
        Ok(())
    }

    async fn list_open_prs(&self, repo_path: &Path) -> Result<Vec<ExternalPr>> {
        let raw = self
            .run(
                repo_path,
                &["pr", "list", "--state", "open", "--json", "number,url,headRefName"],
            )
            .await?;
        parse_pr_list(&raw)
    }

    async fn create_branch(&self, repo_path: &Path, branch_name: &str, base: &str) -> Result<()> {
        let output = tokio::time::timeout(
            CONNECTOR_TIMEOUT,
            Command::new("git")
                .args(["checkout", "-b", branch_name, base])
                .current_dir(repo_path)
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .output(),
        )
        .await
        .map_err(|_| AdapterError::Timeout(CONNECTOR_TIMEOUT))?
        .map_err(|e| AdapterError::ConnectorFailed(format!("git checkout -b: {e}")))?;
        if !output.status.success() {
            return Err(AdapterError::ConnectorFailed(format!(
                "git checkout -b {branch_name} failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(())
    }

    async fn notify_reviewer(&self, session: &str, text: &str) -> Result<()> {
        self.sessions.send_message_with_confirmation(session, text).await?;
        Ok(())
    }
}

fn parse_pr_number(url: &str) -> Option<u64> {
    url.rsplit('/').next()?.parse().ok()
}

#[derive(serde::Deserialize)]
struct GhPrListEntry {
    number: u64,
    url: String,
    #[serde(rename = "headRefName")]
    head_ref_name: String,
}

fn parse_pr_list(raw: &str) -> Result<Vec<ExternalPr>> {
    let entries: Vec<GhPrListEntry> = serde_json::from_str(raw)
        .map_err(|e| AdapterError::ConnectorFailed(format!("invalid gh pr list json: {e}")))?;
    Ok(entries
        .into_iter()
        .map(|e| ExternalPr { number: e.number, url: e.url, branch_name: e.head_ref_name })
        .collect())
}

/// No-op connector used when no VCS provider is configured. Every call
/// succeeds trivially with empty results, so callers can treat "no
/// provider" and "provider with nothing to report" identically.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullVcsConnector;

#[async_trait]
impl VcsConnector for NullVcsConnector {
    async fn submit_pr(
        &self,
        _repo_path: &Path,
        _branch_name: &str,
        _title: &str,
        _body: &str,
    ) -> Result<ExternalPr> {
        Err(AdapterError::NoProviderConfigured)
    }

    async fn approve_pr(&self, _repo_path: &Path, _pr_number: u64) -> Result<()> {
        Ok(())
    }

    async fn merge_pr(
        &self,
        _repo_path: &Path,
        _pr_number: u64,
        _squash: bool,
        _delete_branch: bool,
    ) -> Result<()> {
        Ok(())
    }

    async fn list_open_prs(&self, _repo_path: &Path) -> Result<Vec<ExternalPr>> {
        Ok(Vec::new())
    }

    async fn create_branch(&self, _repo_path: &Path, _branch_name: &str, _base: &str) -> Result<()> {
        Ok(())
    }

    async fn notify_reviewer(&self, _session: &str, _text: &str) -> Result<()> {
        Ok(())
    }
}

/// Test-support fake: records calls, lets tests seed canned PR lists and
/// force failures.
#[cfg(any(test, feature = "test-support"))]
#[derive(Clone, Default)]
pub struct FakeVcsConnector {
    inner: Arc<parking_lot::Mutex<FakeVcsInner>>,
}

#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
struct FakeVcsInner {
    calls: Vec<String>,
    open_prs: Vec<ExternalPr>,
    next_pr_number: u64,
    fail_next: bool,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeVcsConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_open_prs(&self, prs: Vec<ExternalPr>) {
        self.inner.lock().open_prs = prs;
    }

    pub fn fail_next_call(&self) {
        self.inner.lock().fail_next = true;
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().calls.clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl VcsConnector for FakeVcsConnector {
    async fn submit_pr(
        &self,
        _repo_path: &Path,
        branch_name: &str,
        _title: &str,
        _body: &str,
    ) -> Result<ExternalPr> {
        let mut inner = self.inner.lock();
        if std::mem::take(&mut inner.fail_next) {
            return Err(AdapterError::ConnectorFailed("forced failure".to_string()));
        }
        inner.calls.push(format!("submit_pr({branch_name})"));
        inner.next_pr_number += 1;
        let pr = ExternalPr {
            number: inner.next_pr_number,
            url: format!("https://example.test/pr/{}", inner.next_pr_number),
            branch_name: branch_name.to_string(),
        };
        inner.open_prs.push(pr.clone());
        Ok(pr)
    }

    async fn approve_pr(&self, _repo_path: &Path, pr_number: u64) -> Result<()> {
        self.inner.lock().calls.push(format!("approve_pr({pr_number})"));
        Ok(())
    }

    async fn merge_pr(
        &self,
        _repo_path: &Path,
        pr_number: u64,
        squash: bool,
        delete_branch: bool,
    ) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.calls.push(format!("merge_pr({pr_number}, squash={squash}, delete_branch={delete_branch})"));
        inner.open_prs.retain(|pr| pr.number != pr_number);
        Ok(())
    }

    async fn list_open_prs(&self, _repo_path: &Path) -> Result<Vec<ExternalPr>> {
        Ok(self.inner.lock().open_prs.clone())
    }

    async fn create_branch(&self, _repo_path: &Path, branch_name: &str, base: &str) -> Result<()> {
        self.inner.lock().calls.push(format!("create_branch({branch_name}, {base})"));
        Ok(())
    }

    async fn notify_reviewer(&self, session: &str, text: &str) -> Result<()> {
        self.inner.lock().calls.push(format!("notify_reviewer({session}, {text})"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pr_number_from_a_gh_url() {
        assert_eq!(parse_pr_number("https://github.com/acme/repo/pull/42"), Some(42));
    }

    #[test]
    fn parses_a_gh_pr_list_json_array() {
        let raw = r#"[{"number":1,"url":"https://x/pull/1","headRefName":"story/a"}]"#;
        let prs = parse_pr_list(raw).unwrap();
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].number, 1);
        assert_eq!(prs[0].branch_name, "story/a");
    }

    #[tokio::test]
    async fn null_connector_reports_no_provider_on_submit() {
        let connector = NullVcsConnector;
        let err = connector
            .submit_pr(Path::new("/tmp"), "branch", "title", "body")
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::NoProviderConfigured));
    }

    #[tokio::test]
    async fn null_connector_lists_no_open_prs() {
        let connector = NullVcsConnector;
        assert!(connector.list_open_prs(Path::new("/tmp")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fake_connector_tracks_submitted_prs_as_open() {
        let connector = FakeVcsConnector::new();
        connector.submit_pr(Path::new("/tmp"), "story/a", "t", "b").await.unwrap();
        let open = connector.list_open_prs(Path::new("/tmp")).await.unwrap();
        assert_eq!(open.len(), 1);
    }

    #[tokio::test]
    async fn fake_connector_merge_removes_pr_from_open_list() {
        let connector = FakeVcsConnector::new();
        let pr = connector.submit_pr(Path::new("/tmp"), "story/a", "t", "b").await.unwrap();
        connector.merge_pr(Path::new("/tmp"), pr.number, true, true).await.unwrap();
        assert!(connector.list_open_prs(Path::new("/tmp")).await.unwrap().is_empty());
    }
}
