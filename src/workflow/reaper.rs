use tracing::debug;

use crate::context::AppContext;
use crate::domain::branch::BranchName;
use crate::domain::note::{BranchType, Note};
use crate::domain::pull_request::PrState;
use crate::error::{AppError, AppResult, BranchFailure};
use crate::services::version_control::{ORIGIN, UPSTREAM};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionCandidate {
    pub branch_name: String,
    pub branch_type: BranchType,
    pub has_merged_pr: bool,
    /// Set when the merged pull request belongs to the paired `-pr` branch.
    pub merged_via_sibling: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    Deleted(Vec<String>),
    NothingToDelete,
    Declined,
}

/// Brings main up to date and evaluates every branch that tracks `origin`.
/// Only candidates with `has_merged_pr` are meant for deletion.
pub async fn plan_deletions(
    ctx: &AppContext,
    parent_repo: &str,
) -> AppResult<Vec<DeletionCandidate>> {
    let vcs = ctx.version_control.as_ref();
    let main_branch = vcs.main_branch_name().await?;
    vcs.checkout(&main_branch).await?;
    vcs.fast_forward(&main_branch, ORIGIN).await?;
    if vcs.remote_exists(UPSTREAM).await? {
        vcs.fast_forward(&main_branch, UPSTREAM).await?;
    }

    let mut candidates = Vec::new();
    for branch in vcs.branches_tracking_remote(ORIGIN).await? {
        if branch == main_branch {
            continue;
        }
        candidates.push(evaluate(ctx, parent_repo, &main_branch, branch).await?);
    }
    Ok(candidates)
}

async fn evaluate(
    ctx: &AppContext,
    parent_repo: &str,
    main_branch: &str,
    branch: String,
) -> AppResult<DeletionCandidate> {
    let tracker = ctx.issue_tracker.as_ref();
    let branch_type = classify_branch(ctx, &branch, main_branch).await?;

    if let Some(pr) = tracker
        .find_pull_request(parent_repo, &branch, PrState::Merged)
        .await?
    {
        debug!(%branch, kind = branch_type.as_str(), pr = pr.number, url = %pr.url, "merged");
        return Ok(DeletionCandidate {
            branch_name: branch,
            branch_type,
            has_merged_pr: true,
            merged_via_sibling: None,
        });
    }

    let mut merged_via_sibling = None;
    if branch_type == BranchType::Dev
        && let Some(sibling) = BranchName(branch.clone()).sibling_pr()
        && let Some(pr) = tracker
            .find_pull_request(parent_repo, sibling.as_str(), PrState::Merged)
            .await?
    {
        debug!(%branch, %sibling, pr = pr.number, title = %pr.title, "paired branch merged");
        merged_via_sibling = Some(sibling.0);
    }

    Ok(DeletionCandidate {
        branch_name: branch,
        branch_type,
        has_merged_pr: merged_via_sibling.is_some(),
        merged_via_sibling,
    })
}

/// The branch's own note decides its type; the name suffix is the fallback.
async fn classify_branch(
    ctx: &AppContext,
    branch: &str,
    main_branch: &str,
) -> AppResult<BranchType> {
    let messages = ctx
        .version_control
        .branch_messages(branch, main_branch)
        .await?;
    Ok(Note::parse(&messages.join("\n"))
        .map(|note| note.branch_type)
        .unwrap_or_else(|| BranchType::from_branch_name(branch)))
}

/// Deletes every candidate with a merged pull request. Each deletion is
/// attempted; failures are collected into `PartialDeletionFailure`.
pub async fn apply_deletions(
    ctx: &AppContext,
    candidates: &[DeletionCandidate],
) -> AppResult<Vec<String>> {
    let mut deleted = Vec::new();
    let mut failures = Vec::new();
    for candidate in candidates.iter().filter(|c| c.has_merged_pr) {
        let branch = &candidate.branch_name;
        match ctx.version_control.delete_branch(branch).await {
            Ok(()) => {
                ctx.console
                    .say(&format!("Branch '{branch}' deleted successfully."));
                deleted.push(branch.clone());
            }
            Err(err) => {
                ctx.console
                    .say(&format!("Error deleting branch '{branch}': {err}"));
                failures.push(BranchFailure {
                    branch: branch.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }
    if failures.is_empty() {
        Ok(deleted)
    } else {
        Err(AppError::PartialDeletionFailure(failures))
    }
}

/// Deletes local branches whose pull requests were merged into `parent_repo`.
pub async fn delete_merged_branches(
    ctx: &AppContext,
    parent_repo: &str,
) -> AppResult<DeletionOutcome> {
    let candidates = plan_deletions(ctx, parent_repo).await?;
    let doomed: Vec<&DeletionCandidate> = candidates.iter().filter(|c| c.has_merged_pr).collect();
    if doomed.is_empty() {
        ctx.console.say("No branches to delete.");
        return Ok(DeletionOutcome::NothingToDelete);
    }

    ctx.console.say("Branches to be deleted:");
    for candidate in &doomed {
        match &candidate.merged_via_sibling {
            Some(sibling) => ctx
                .console
                .say(&format!("{} (merged as {sibling})", candidate.branch_name)),
            None => ctx.console.say(&candidate.branch_name),
        }
    }
    ctx.console.say("");
    if !ctx.console.confirm("Proceed with deletion")? {
        ctx.console.say("Ok, see you");
        return Ok(DeletionOutcome::Declined);
    }

    let deleted = apply_deletions(ctx, &candidates).await?;
    Ok(DeletionOutcome::Deleted(deleted))
}
