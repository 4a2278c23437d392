use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::branch::BranchName;
use crate::error::AppResult;

pub const ORIGIN: &str = "origin";
pub const UPSTREAM: &str = "upstream";

#[async_trait]
pub trait VersionControlService: Send + Sync {
    async fn current_branch(&self) -> AppResult<String>;
    async fn main_branch_name(&self) -> AppResult<String>;
    async fn has_uncommitted_changes(&self) -> AppResult<bool>;
    async fn stash(&self) -> AppResult<()>;
    async fn unstash(&self) -> AppResult<()>;
    /// Fast-forwards the checked-out `branch` from `remote`.
    async fn fast_forward(&self, branch: &str, remote: &str) -> AppResult<()>;
    async fn checkout(&self, branch: &str) -> AppResult<()>;
    /// Creates `name` from `from`, records `notes` as its first commit and publishes it.
    async fn create_branch(
        &self,
        name: &BranchName,
        from: &str,
        notes: &[String],
    ) -> AppResult<()>;
    async fn branch_exists_local(&self, name: &str) -> AppResult<bool>;
    async fn branch_exists_remote(&self, remote: &str, name: &str) -> AppResult<bool>;
    async fn remote_exists(&self, name: &str) -> AppResult<bool>;
    async fn add_remote(&self, name: &str, url: &str) -> AppResult<()>;
    async fn delete_branch(&self, name: &str) -> AppResult<()>;
    async fn branches_tracking_remote(&self, remote: &str) -> AppResult<Vec<String>>;
    /// Commit message lines on `branch` that are not reachable from `base`.
    async fn branch_messages(&self, branch: &str, base: &str) -> AppResult<Vec<String>>;
    /// `owner/repo` parsed from the remote URL.
    async fn repo_slug(&self, remote: &str) -> AppResult<String>;
    async fn root_dir(&self) -> AppResult<PathBuf>;
}
