use async_trait::async_trait;

use crate::domain::issue::IssueReference;
use crate::domain::pull_request::{IssueLink, PrState, PullRequest};
use crate::error::AppResult;

#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    /// Title of a GitHub issue or Jira ticket. Free-form references have no tracker title.
    async fn fetch_issue_title(&self, issue: &IssueReference) -> AppResult<String>;
    async fn link_branch_to_issue(&self, link: &IssueLink) -> AppResult<()>;
    async fn find_pull_request(
        &self,
        repo: &str,
        branch: &str,
        state: PrState,
    ) -> AppResult<Option<PullRequest>>;
    /// `owner/repo` this repository was forked from, if any.
    async fn parent_repo(&self) -> AppResult<Option<String>>;
}
