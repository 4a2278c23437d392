use tracing::{debug, info, warn};

use crate::context::AppContext;
use crate::domain::branch::{BranchName, BranchPlan};
use crate::domain::issue::IssueReference;
use crate::domain::pull_request::IssueLink;
use crate::error::{AppError, AppResult};
use crate::services::VersionControlService;
use crate::services::version_control::{ORIGIN, UPSTREAM};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevBranchOutcome {
    Created { branch: BranchName },
    Declined,
}

/// Holds uncommitted changes stashed for the duration of the workflow.
///
/// `release` pops the stash. A guard dropped without release leaves the
/// changes stashed and logs a warning so the operator can restore them.
#[must_use]
pub struct StashGuard<'a> {
    vcs: &'a dyn VersionControlService,
    stashed: bool,
}

impl<'a> StashGuard<'a> {
    pub async fn acquire(vcs: &'a dyn VersionControlService) -> AppResult<Self> {
        let stashed = if vcs.has_uncommitted_changes().await? {
            vcs.stash().await.map_err(|err| {
                AppError::VcsOperationFailed(format!("error stashing changes: {err}"))
            })?;
            info!("uncommitted changes stashed");
            true
        } else {
            false
        };
        Ok(Self { vcs, stashed })
    }

    pub async fn release(mut self) -> AppResult<()> {
        if !self.stashed {
            return Ok(());
        }
        self.stashed = false;
        self.vcs.unstash().await.map_err(|err| {
            AppError::VcsOperationFailed(format!(
                "error unstashing changes: {err}; they remain in `git stash list`"
            ))
        })?;
        info!("stashed changes restored");
        Ok(())
    }

    /// Releases the guard after `err` and returns `err`; a failed release is logged.
    async fn release_after(self, err: AppError) -> AppError {
        if let Err(release_err) = self.release().await {
            warn!("{release_err}");
        }
        err
    }
}

impl Drop for StashGuard<'_> {
    fn drop(&mut self) {
        if self.stashed {
            warn!(
                "uncommitted changes remain stashed after a failure; run `git stash pop` to restore them"
            );
        }
    }
}

/// Creates a dev branch for the issue described by `raw`.
pub async fn create_dev_branch(ctx: &AppContext, raw: &str) -> AppResult<DevBranchOutcome> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::InvalidReference(
            "nothing to create a branch from: pass an issue URL or a description".to_string(),
        ));
    }
    let vcs = ctx.version_control.as_ref();

    let parent_repo = ctx.issue_tracker.parent_repo().await?;
    let upstream_exists = vcs.remote_exists(UPSTREAM).await?;
    if parent_repo.is_none() && upstream_exists {
        let repo = vcs.repo_slug(ORIGIN).await?;
        return Err(AppError::MissingForkConfiguration { repo });
    }

    let main_branch = vcs.main_branch_name().await?;
    let current = vcs.current_branch().await?;
    if current != main_branch {
        return Err(AppError::NotOnMainBranch {
            current,
            main: main_branch,
        });
    }

    let issue = IssueReference::classify(raw)?;
    debug!(kind = ?issue.kind(), id = %issue.id(), "issue classified");

    let stash = StashGuard::acquire(vcs).await?;
    let plan = match prepare_plan(ctx, &issue, &main_branch, upstream_exists).await {
        Ok(plan) => plan,
        Err(err) => return Err(stash.release_after(err).await),
    };

    let question = format!("Dev branch '{}' will be created. Continue", plan.name);
    let confirmed = match ctx.console.confirm(&question) {
        Ok(answer) => answer,
        Err(err) => return Err(stash.release_after(err).await),
    };
    if !confirmed {
        ctx.console.say("Ok, see you");
        stash.release().await?;
        return Ok(DevBranchOutcome::Declined);
    }

    if let Some(parent) = parent_repo.as_deref()
        && !upstream_exists
    {
        let question = format!(
            "Upstream not found. Repository {parent} will be added as upstream. Agree"
        );
        let agreed = match ctx.console.confirm(&question) {
            Ok(answer) => answer,
            Err(err) => return Err(stash.release_after(err).await),
        };
        if !agreed {
            ctx.console.say("Ok, see you");
            stash.release().await?;
            return Ok(DevBranchOutcome::Declined);
        }
        let url = format!("https://github.com/{parent}.git");
        if let Err(err) = vcs.add_remote(UPSTREAM, &url).await {
            return Err(stash.release_after(err).await);
        }
        info!(%parent, "upstream remote added");
    }

    if let Err(err) = vcs
        .create_branch(&plan.name, &main_branch, &plan.comments)
        .await
    {
        return Err(stash.release_after(err).await);
    }
    info!(branch = %plan.name, "dev branch created");

    if let IssueReference::GitHub { number, .. } = &issue {
        // The branch stays in place when linking fails.
        let link = IssueLink {
            issue_repo: issue.github_repo()?,
            issue_number: *number,
            branch: plan.name.as_str().to_string(),
            branch_repo: vcs.repo_slug(ORIGIN).await?,
            base: main_branch.clone(),
        };
        ctx.issue_tracker.link_branch_to_issue(&link).await?;
        info!(issue = number, "branch linked to issue");
    }

    maintain_hooks(ctx).await;

    stash.release().await?;
    ctx.console.say(&format!("Dev branch '{}' created.", plan.name));
    Ok(DevBranchOutcome::Created { branch: plan.name })
}

async fn prepare_plan(
    ctx: &AppContext,
    issue: &IssueReference,
    main_branch: &str,
    upstream_exists: bool,
) -> AppResult<BranchPlan> {
    let vcs = ctx.version_control.as_ref();
    vcs.fast_forward(main_branch, ORIGIN).await?;
    if upstream_exists {
        vcs.fast_forward(main_branch, UPSTREAM).await?;
    }

    let title = match issue {
        IssueReference::FreeForm { text } => text.clone(),
        _ => ctx.issue_tracker.fetch_issue_title(issue).await?,
    };
    let plan = BranchPlan::build(issue, &title)?;

    let name = plan.name.as_str();
    if vcs.branch_exists_local(name).await? || vcs.branch_exists_remote(ORIGIN, name).await? {
        return Err(AppError::BranchAlreadyExists(name.to_string()));
    }
    Ok(plan)
}

async fn maintain_hooks(ctx: &AppContext) {
    let root = match ctx.version_control.root_dir().await {
        Ok(root) => root,
        Err(err) => {
            warn!("skipping hook maintenance: {err}");
            return;
        }
    };
    if let Err(err) = ctx.hooks.ensure_hook_installed(&root) {
        warn!("error setting pre-commit hook: {err}");
    }
    if let Err(err) = ctx.hooks.refresh_large_file_hook(&root) {
        warn!("error updating large file hook content: {err}");
    }
}
