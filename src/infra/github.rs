use std::path::PathBuf;

use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::domain::pull_request::{IssueLink, PrState, PullRequest};
use crate::error::{AppError, AppResult};

/// GitHub access through the `gh` command-line tool.
pub struct GhCli {
    workspace_root: PathBuf,
}

impl GhCli {
    pub fn new(workspace_root: PathBuf) -> Self {
        Self { workspace_root }
    }

    async fn run(&self, args: &[&str]) -> AppResult<String> {
        debug!(command = %format!("gh {}", args.join(" ")), "running");
        let output = Command::new("gh")
            .args(args)
            .current_dir(&self.workspace_root)
            .output()
            .await
            .map_err(|err| AppError::TrackerUnavailable(format!("failed to run gh: {err}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(status = %output.status, stdout = %stdout, "gh finished");
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AppError::TrackerUnavailable(if stderr.is_empty() {
                format!("gh {} exited with {}", args.join(" "), output.status)
            } else {
                stderr
            }));
        }
        Ok(stdout)
    }

    pub async fn issue_title(&self, repo: &str, number: u64) -> AppResult<String> {
        let number = number.to_string();
        let stdout = self
            .run(&["issue", "view", &number, "--repo", repo, "--json", "title"])
            .await?;
        parse_issue_title(&stdout)
    }

    pub async fn link_branch(&self, link: &IssueLink) -> AppResult<()> {
        self.run(&["repo", "set-default", &link.branch_repo]).await?;
        let number = link.issue_number.to_string();
        let branch_repo = format!("--branch-repo={}", link.branch_repo);
        let repo = format!("--repo={}", link.issue_repo);
        let name = format!("--name={}", link.branch);
        let base = format!("--base={}", link.base);
        self.run(&["issue", "develop", &number, &branch_repo, &repo, &name, &base])
            .await?;
        Ok(())
    }

    pub async fn find_pull_request(
        &self,
        repo: &str,
        branch: &str,
        state: PrState,
    ) -> AppResult<Option<PullRequest>> {
        let mut args = vec![
            "pr",
            "list",
            "--head",
            branch,
            "--state",
            state.as_str(),
            "--json",
            "number,url,title",
            "--limit",
            "1",
        ];
        if !repo.is_empty() {
            args.extend(["--repo", repo]);
        }
        let stdout = self.run(&args).await?;
        parse_first_pull_request(&stdout)
    }

    pub async fn parent_repo(&self) -> AppResult<Option<String>> {
        let stdout = self.run(&["repo", "view", "--json", "parent"]).await?;
        parse_parent_repo(&stdout)
    }
}

fn parse_issue_title(json: &str) -> AppResult<String> {
    #[derive(Deserialize)]
    struct IssueView {
        title: String,
    }
    serde_json::from_str::<IssueView>(json)
        .map(|issue| issue.title)
        .map_err(|err| AppError::TrackerUnavailable(format!("failed to parse issue data: {err}")))
}

fn parse_first_pull_request(json: &str) -> AppResult<Option<PullRequest>> {
    if json.is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Vec<PullRequest>>(json)
        .map(|prs| prs.into_iter().next())
        .map_err(|err| {
            AppError::TrackerUnavailable(format!("failed to parse pull request list: {err}"))
        })
}

fn parse_parent_repo(json: &str) -> AppResult<Option<String>> {
    #[derive(Deserialize)]
    struct RepoView {
        parent: Option<ParentRepo>,
    }
    #[derive(Deserialize)]
    struct ParentRepo {
        name: String,
        owner: Owner,
    }
    #[derive(Deserialize)]
    struct Owner {
        login: String,
    }

    let view: RepoView = serde_json::from_str(json).map_err(|err| {
        AppError::TrackerUnavailable(format!("failed to parse repository data: {err}"))
    })?;
    Ok(view
        .parent
        .map(|parent| format!("{}/{}", parent.owner.login, parent.name)))
}
