use std::io::{self, Write};

use clap::{Args, Subcommand};

use crate::config::{DEFAULT_LARGE_FILE_LIMIT_MB, StoredConfig, config_file_path};
use crate::error::{AppError, AppResult};

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the stored configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    println!("Configuring sprout.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!("The Jira token is stored in the local config file; protect it accordingly.");
    println!();

    apply_prompt(
        "Jira base URL (e.g., https://company.atlassian.net)",
        &mut cfg.jira_base_url,
        false,
    )?;
    apply_prompt("Jira email", &mut cfg.jira_email, false)?;
    apply_prompt("Jira API token", &mut cfg.jira_token, true)?;

    let mut limit = cfg.large_file_limit_mb.map(|mb| mb.to_string());
    apply_prompt("Largest committable file in MB", &mut limit, false)?;
    cfg.large_file_limit_mb = limit
        .map(|raw| {
            raw.parse::<u64>().map_err(|err| {
                AppError::Configuration(format!("'{raw}' is not a number of megabytes: {err}"))
            })
        })
        .transpose()?;

    cfg.save()?;

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    println!("Jira base URL: {}", display_value(&cfg.jira_base_url));
    println!("Jira email: {}", display_value(&cfg.jira_email));
    println!("Jira API token: {}", mask_secret(&cfg.jira_token));
    println!(
        "Large file limit: {} MB",
        cfg.large_file_limit_mb
            .unwrap_or(DEFAULT_LARGE_FILE_LIMIT_MB)
    );

    Ok(())
}

fn apply_prompt(field: &str, target: &mut Option<String>, secret: bool) -> AppResult<()> {
    let mut stdout = io::stdout();
    match (target.as_deref(), secret) {
        (Some(_), true) => write!(stdout, "{field} [****] (Enter to keep, '-' to clear): ")?,
        (Some(value), false) => {
            write!(stdout, "{field} [{value}] (Enter to keep, '-' to clear): ")?
        }
        (None, _) => write!(stdout, "{field} (Enter to skip): ")?,
    }
    stdout.flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    apply_answer(target, &input);
    Ok(())
}

/// Empty keeps the value, `-` clears it, anything else replaces it.
fn apply_answer(target: &mut Option<String>, answer: &str) {
    match answer.trim() {
        "" => {}
        "-" => *target = None,
        value => *target = Some(value.to_string()),
    }
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.len() > 6 && token.is_ascii() => {
            let prefix = &token[..3];
            let suffix = &token[token.len() - 3..];
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}
