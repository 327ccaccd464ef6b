// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Role-specific first-message templates (spec.md §4.2's agent-spawn
//! protocol step 4): "parameterised by team name, repo URL, repo path,
//! session name, target branch, and whether progress updates are enabled."

use hive_core::RoleType;

/// Everything a spawned agent's opening message is templated from.
pub struct PromptContext<'a> {
    pub team_name: &'a str,
    pub repo_url: &'a str,
    pub repo_path: &'a str,
    pub session_name: &'a str,
    pub target_branch: &'a str,
    pub progress_updates_enabled: bool,
}

/// Render the first message delivered to a freshly spawned agent's session.
pub fn render(role: RoleType, ctx: &PromptContext<'_>) -> String {
    let progress_line = if ctx.progress_updates_enabled {
        "Post a progress update with `hive progress <story> -m \"…\"` after each \
         meaningful milestone, and `--done` when you finish a story."
    } else {
        "Progress updates are disabled for this team; work without narrating milestones."
    };

    let header = format!(
        "You are a {role} agent on team \"{team}\" (session `{session}`).\n\
         Repository: {repo_url}\n\
         Working directory: {repo_path}\n\
         Target branch: {branch}\n\n",
        role = role,
        team = ctx.team_name,
        session = ctx.session_name,
        repo_url = ctx.repo_url,
        repo_path = ctx.repo_path,
        branch = ctx.target_branch,
    );

    let body = match role {
        RoleType::TechLead => tech_lead_body(),
        RoleType::Senior | RoleType::Intermediate | RoleType::Junior => worker_body(),
        RoleType::Qa => qa_body(),
        RoleType::FeatureTest => feature_test_body(ctx),
    };

    format!("{header}{body}\n\n{progress_line}\n")
}

fn tech_lead_body() -> &'static str {
    "Run `hive my-stories` to see unplanned requirements. For each, decompose \
     it into stories sized by complexity (1-13), record dependencies between \
     them, and submit your plan. If the requirement is ambiguous, escalate \
     with a clear reason instead of guessing."
}

fn worker_body() -> &'static str {
    "Run `hive my-stories` to see your assigned story. Implement it on a \
     feature branch, keep the story's acceptance criteria in view, and submit \
     a pull request with `hive pr submit` when ready. Use `hive escalate` if \
     you are blocked on something only a human can resolve."
}

fn qa_body() -> &'static str {
    "Run `hive pr queue` to see pull requests awaiting review. Review the \
     oldest queued PR first: check it against the story's acceptance \
     criteria, then `hive pr approve` or `hive pr reject` with review notes."
}

fn feature_test_body(ctx: &PromptContext<'_>) -> String {
    format!(
        "Run the end-to-end test suite against `{branch}`. When finished, \
         report the verdict as exactly one of `E2E tests PASSED` or \
         `E2E tests FAILED` on its own line — the manager matches that \
         marker verbatim.",
        branch = ctx.target_branch,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PromptContext<'static> {
        PromptContext {
            team_name: "Backend",
            repo_url: "git@example.test:acme/backend.git",
            repo_path: "/hive/repos/backend",
            session_name: "hive-senior-backend",
            target_branch: "main",
            progress_updates_enabled: true,
        }
    }

    #[test]
    fn worker_prompt_includes_session_and_branch() {
        let rendered = render(RoleType::Senior, &ctx());
        assert!(rendered.contains("hive-senior-backend"));
        assert!(rendered.contains("main"));
        assert!(rendered.contains("hive pr submit"));
    }

    #[test]
    fn feature_test_prompt_names_the_exact_verdict_markers() {
        let rendered = render(RoleType::FeatureTest, &ctx());
        assert!(rendered.contains("E2E tests PASSED"));
        assert!(rendered.contains("E2E tests FAILED"));
    }

    #[test]
    fn disabled_progress_updates_suppress_the_reminder() {
        let mut c = ctx();
        c.progress_updates_enabled = false;
        let rendered = render(RoleType::Junior, &c);
        assert!(rendered.contains("disabled"));
        assert!(!rendered.contains("hive progress"));
    }
}
