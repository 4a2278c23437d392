mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
#[cfg(test)]
mod testing;
mod workflow;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::dev::{self, DevCommandArgs, DevCommandOutcome};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::git::GitCli;
use crate::infra::github::GhCli;
use crate::infra::hooks::GitHookInstaller;
use crate::infra::jira::JiraClient;
use crate::infra::terminal::{TerminalConsole, clipboard_text};
use crate::infra::tracker::TrackerGateway;
use crate::workflow::dev_branch::DevBranchOutcome;
use crate::workflow::reaper::DeletionOutcome;

#[derive(Parser)]
#[command(
    name = "sprout",
    author,
    version,
    about = "Issue-driven dev branch workflow for git"
)]
struct Cli {
    /// Log external commands and workflow steps.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a dev branch from an issue URL or description, or clean up merged branches.
    Dev(DevArgs),
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct DevArgs {
    /// GitHub issue URL, Jira ticket URL or free text; read from the clipboard when omitted.
    text: Vec<String>,

    /// Delete local branches whose pull requests were merged.
    #[arg(short, long)]
    delete: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(error) = run(cli.command).await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "sprout=debug" } else { "sprout=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Commands) -> AppResult<()> {
    match command {
        Commands::Config(args) => config_cmd::run(args.command),
        Commands::Dev(args) => run_dev(args).await,
    }
}

async fn run_dev(args: DevArgs) -> AppResult<()> {
    let cwd = std::env::current_dir()?;
    let config = AppConfig::load(&cwd)?;

    if config.jira_base_url.is_none() {
        tracing::warn!("Jira base URL not configured; only Jira ticket URLs can be resolved.");
    }
    if config.jira_email.is_none() || config.jira_token.is_none() {
        tracing::warn!("Jira credentials not configured; Jira ticket titles cannot be fetched.");
    }

    let git = Arc::new(GitCli::new(config.workspace_root.clone()));
    let issue_tracker = Arc::new(TrackerGateway::new(
        GhCli::new(config.workspace_root.clone()),
        JiraClient::new(
            config.jira_base_url.clone(),
            config.jira_email.clone(),
            config.jira_token.clone(),
        ),
    ));
    let hooks = Arc::new(GitHookInstaller::new(config.large_file_limit_mb));

    let context = AppContext::new(git, issue_tracker, hooks, Arc::new(TerminalConsole));

    let outcome = dev::run(
        &context,
        DevCommandArgs {
            text: args.text,
            delete: args.delete,
        },
        clipboard_text,
    )
    .await?;

    match outcome {
        DevCommandOutcome::Branch(DevBranchOutcome::Created { branch }) => {
            println!("Now on {branch}");
        }
        DevCommandOutcome::Cleanup(DeletionOutcome::Deleted(branches)) => {
            println!("{} branch(es) deleted.", branches.len());
        }
        DevCommandOutcome::Branch(DevBranchOutcome::Declined)
        | DevCommandOutcome::Cleanup(
            DeletionOutcome::Declined | DeletionOutcome::NothingToDelete,
        ) => {}
    }
    Ok(())
}
