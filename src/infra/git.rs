use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::domain::branch::BranchName;
use crate::error::{AppError, AppResult};
use crate::services::VersionControlService;
use crate::services::version_control::ORIGIN;

pub struct GitCli {
    workspace_root: PathBuf,
}

impl GitCli {
    pub fn new(workspace_root: PathBuf) -> Self {
        Self { workspace_root }
    }

    async fn run(&self, args: &[&str]) -> AppResult<String> {
        let output = self.output(args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AppError::VcsOperationFailed(if stderr.is_empty() {
                format!("git {} exited with {}", args.join(" "), output.status)
            } else {
                stderr
            }));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Like `run` but a non-zero exit yields `None` instead of an error.
    async fn try_run(&self, args: &[&str]) -> AppResult<Option<String>> {
        let output = self.output(args).await?;
        Ok(output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string()))
    }

    async fn output(&self, args: &[&str]) -> AppResult<std::process::Output> {
        debug!(command = %format!("git {}", args.join(" ")), "running");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workspace_root)
            .output()
            .await
            .map_err(|err| AppError::VcsOperationFailed(format!("failed to run git: {err}")))?;
        debug!(
            status = %output.status,
            stdout = %String::from_utf8_lossy(&output.stdout).trim(),
            "git finished"
        );
        Ok(output)
    }
}

#[async_trait]
impl VersionControlService for GitCli {
    async fn current_branch(&self) -> AppResult<String> {
        let branch = self.run(&["branch", "--show-current"]).await?;
        if branch.is_empty() {
            return Err(AppError::VcsOperationFailed(
                "not on a branch (detached HEAD?)".to_string(),
            ));
        }
        Ok(branch)
    }

    async fn main_branch_name(&self) -> AppResult<String> {
        if let Some(head) = self
            .try_run(&["symbolic-ref", "--short", "refs/remotes/origin/HEAD"])
            .await?
            && let Some(name) = head.strip_prefix("origin/")
        {
            return Ok(name.to_string());
        }
        for candidate in ["main", "master"] {
            if self.branch_exists_local(candidate).await? {
                return Ok(candidate.to_string());
            }
        }
        Err(AppError::VcsOperationFailed(
            "cannot determine the main branch".to_string(),
        ))
    }

    async fn has_uncommitted_changes(&self) -> AppResult<bool> {
        Ok(!self.run(&["status", "--porcelain"]).await?.is_empty())
    }

    async fn stash(&self) -> AppResult<()> {
        self.run(&["stash", "push", "--include-untracked"]).await?;
        Ok(())
    }

    async fn unstash(&self) -> AppResult<()> {
        self.run(&["stash", "pop"]).await?;
        Ok(())
    }

    async fn fast_forward(&self, branch: &str, remote: &str) -> AppResult<()> {
        self.run(&["pull", "--ff-only", remote, branch]).await?;
        Ok(())
    }

    async fn checkout(&self, branch: &str) -> AppResult<()> {
        self.run(&["checkout", branch]).await?;
        Ok(())
    }

    async fn create_branch(
        &self,
        name: &BranchName,
        from: &str,
        notes: &[String],
    ) -> AppResult<()> {
        self.run(&["checkout", "-b", name.as_str(), from]).await?;

        let mut args = vec!["commit", "--allow-empty"];
        for line in notes.iter().map(|line| line.trim()).filter(|line| !line.is_empty()) {
            args.push("-m");
            args.push(line);
        }
        if args.len() == 2 {
            args.extend(["-m", name.as_str()]);
        }
        self.run(&args).await?;

        self.run(&["push", "-u", ORIGIN, name.as_str()]).await?;
        Ok(())
    }

    async fn branch_exists_local(&self, name: &str) -> AppResult<bool> {
        Ok(!self.run(&["branch", "--list", name]).await?.is_empty())
    }

    async fn branch_exists_remote(&self, remote: &str, name: &str) -> AppResult<bool> {
        let head = format!("refs/heads/{name}");
        let listing = self.run(&["ls-remote", "--heads", remote, &head]).await?;
        Ok(lists_head(&listing, &head))
    }

    async fn remote_exists(&self, name: &str) -> AppResult<bool> {
        let remotes = self.run(&["remote"]).await?;
        Ok(remotes.lines().any(|remote| remote.trim() == name))
    }

    async fn add_remote(&self, name: &str, url: &str) -> AppResult<()> {
        self.run(&["remote", "add", name, url]).await?;
        self.run(&["fetch", name]).await?;
        Ok(())
    }

    async fn delete_branch(&self, name: &str) -> AppResult<()> {
        if self.branch_exists_remote(ORIGIN, name).await? {
            self.run(&["push", ORIGIN, "--delete", name]).await?;
        }
        self.run(&["branch", "-D", name]).await?;
        Ok(())
    }

    async fn branches_tracking_remote(&self, remote: &str) -> AppResult<Vec<String>> {
        let listing = self
            .run(&[
                "for-each-ref",
                "--format=%(refname:short) %(upstream:short)",
                "refs/heads",
            ])
            .await?;
        Ok(parse_tracking_branches(&listing, remote))
    }

    async fn branch_messages(&self, branch: &str, base: &str) -> AppResult<Vec<String>> {
        let range = format!("{base}..{branch}");
        let log = self.run(&["log", "--format=%B", &range]).await?;
        Ok(log.lines().map(str::to_string).collect())
    }

    async fn repo_slug(&self, remote: &str) -> AppResult<String> {
        let url = self.run(&["remote", "get-url", remote]).await?;
        parse_repo_slug(&url).ok_or_else(|| {
            AppError::VcsOperationFailed(format!("cannot parse repository from remote URL {url}"))
        })
    }

    async fn root_dir(&self) -> AppResult<PathBuf> {
        Ok(PathBuf::from(
            self.run(&["rev-parse", "--show-toplevel"]).await?,
        ))
    }
}

/// `ls-remote` matches ref patterns by suffix, so `refs/heads/x` also lists `refs/heads/y/x`.
fn lists_head(listing: &str, head: &str) -> bool {
    listing
        .lines()
        .filter_map(|line| line.split('\t').nth(1))
        .any(|reference| reference.trim() == head)
}

fn parse_tracking_branches(listing: &str, remote: &str) -> Vec<String> {
    let prefix = format!("{remote}/");
    listing
        .lines()
        .filter_map(|line| {
            let (branch, upstream) = line.trim().split_once(' ')?;
            upstream.starts_with(&prefix).then(|| branch.to_string())
        })
        .collect()
}

/// `owner/repo` from `https://host/owner/repo(.git)` or `git@host:owner/repo(.git)`.
fn parse_repo_slug(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let path = match trimmed.split_once("://") {
        Some((_, rest)) => rest.split_once('/')?.1,
        None => trimmed.split_once(':')?.1,
    };
    let mut parts = path.rsplitn(2, '/');
    let repo = parts.next()?;
    let owner = parts.next()?.rsplit('/').next()?;
    (!owner.is_empty() && !repo.is_empty()).then(|| format!("{owner}/{repo}"))
}
