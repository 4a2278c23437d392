use crate::context::AppContext;
use crate::error::AppResult;
use crate::services::version_control::ORIGIN;
use crate::workflow::dev_branch::{DevBranchOutcome, create_dev_branch};
use crate::workflow::reaper::{DeletionOutcome, delete_merged_branches};

#[derive(Debug, Clone)]
pub struct DevCommandArgs {
    pub text: Vec<String>,
    pub delete: bool,
}

#[derive(Debug)]
pub enum DevCommandOutcome {
    Branch(DevBranchOutcome),
    Cleanup(DeletionOutcome),
}

pub async fn run(
    ctx: &AppContext,
    args: DevCommandArgs,
    clipboard: impl FnOnce() -> String,
) -> AppResult<DevCommandOutcome> {
    if args.delete {
        let parent_repo = match ctx.issue_tracker.parent_repo().await? {
            Some(parent) => parent,
            None => ctx.version_control.repo_slug(ORIGIN).await?,
        };
        let outcome = delete_merged_branches(ctx, &parent_repo).await?;
        return Ok(DevCommandOutcome::Cleanup(outcome));
    }

    let input = issue_input(&args.text, clipboard);
    let outcome = create_dev_branch(ctx, &input).await?;
    Ok(DevCommandOutcome::Branch(outcome))
}

/// Words from the command line, or the clipboard when none were given.
fn issue_input(words: &[String], clipboard: impl FnOnce() -> String) -> String {
    if words.is_empty() {
        clipboard().trim().to_string()
    } else {
        words.join(" ").trim().to_string()
    }
}
