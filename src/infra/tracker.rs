use async_trait::async_trait;

use crate::domain::issue::IssueReference;
use crate::domain::pull_request::{IssueLink, PrState, PullRequest};
use crate::error::AppResult;
use crate::infra::github::GhCli;
use crate::infra::jira::JiraClient;
use crate::services::IssueTrackerService;

/// Routes issue lookups to GitHub or Jira; pull requests always live on GitHub.
pub struct TrackerGateway {
    github: GhCli,
    jira: JiraClient,
}

impl TrackerGateway {
    pub fn new(github: GhCli, jira: JiraClient) -> Self {
        Self { github, jira }
    }
}

#[async_trait]
impl IssueTrackerService for TrackerGateway {
    async fn fetch_issue_title(&self, issue: &IssueReference) -> AppResult<String> {
        match issue {
            IssueReference::GitHub { number, .. } => {
                let repo = issue.github_repo()?;
                self.github.issue_title(&repo, *number).await
            }
            IssueReference::Jira { key, .. } => {
                self.jira.issue_title(issue.jira_base_url(), key).await
            }
            IssueReference::FreeForm { text } => Ok(text.clone()),
        }
    }

    async fn link_branch_to_issue(&self, link: &IssueLink) -> AppResult<()> {
        self.github.link_branch(link).await
    }

    async fn find_pull_request(
        &self,
        repo: &str,
        branch: &str,
        state: PrState,
    ) -> AppResult<Option<PullRequest>> {
        self.github.find_pull_request(repo, branch, state).await
    }

    async fn parent_repo(&self) -> AppResult<Option<String>> {
        self.github.parent_repo().await
    }
}
