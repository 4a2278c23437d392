use std::sync::LazyLock;

use regex::Regex;

use crate::domain::issue::IssueReference;
use crate::domain::note::{BranchType, Note};
use crate::error::{AppError, AppResult};

pub const MAX_BRANCH_NAME_LENGTH: usize = 100;
pub const DEV_SUFFIX: &str = "-dev";
pub const PR_SUFFIX: &str = "-pr";

const ISSUE_PR_TITLE_PREFIX: &str = "Resolves issue";
const ISSUE_SIGN: &str = "Resolves #";

static DISALLOWED_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("branch symbol pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchName(pub String);

impl BranchName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the paired pull-request branch: trailing `-dev` becomes `-pr`.
    pub fn sibling_pr(&self) -> Option<BranchName> {
        self.0
            .strip_suffix(DEV_SUFFIX)
            .map(|stem| BranchName(format!("{stem}{PR_SUFFIX}")))
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A dev branch ready to be created, with the commit-message lines it starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPlan {
    pub name: BranchName,
    pub comments: Vec<String>,
}

impl BranchPlan {
    /// Derives the dev branch name and commit notes from an issue and its title.
    /// Free-form references use their own text as the title.
    pub fn build(issue: &IssueReference, title: &str) -> AppResult<Self> {
        if matches!(issue, IssueReference::GitHub { .. }) {
            issue.github_repo()?;
        }
        let id = issue.id();
        let kebab = clean_from_special_symbols(title);
        let mut name = if id.is_empty() {
            kebab
        } else {
            format!("{id}-{kebab}")
        };
        // Byte cut: everything is ASCII after cleaning, except a raw tracker id.
        if name.len() > MAX_BRANCH_NAME_LENGTH {
            let mut cut = MAX_BRANCH_NAME_LENGTH;
            while !name.is_char_boundary(cut) {
                cut -= 1;
            }
            name.truncate(cut);
        }
        let stem = clean_from_special_symbols(&name);
        if stem.is_empty() {
            return Err(AppError::InvalidReference(format!(
                "'{}' has nothing usable for a branch name",
                issue.raw_text()
            )));
        }
        let name = format!("{stem}{DEV_SUFFIX}");

        let (github_url, jira_url) = match issue {
            IssueReference::GitHub { url, .. } => (url.as_str(), ""),
            IssueReference::Jira { url, .. } => ("", url.as_str()),
            IssueReference::FreeForm { .. } => ("", ""),
        };
        let note = Note::new(github_url, jira_url, BranchType::Dev, title).serialize()?;

        let comments = match issue {
            IssueReference::GitHub { .. } => {
                let body = if title.is_empty() {
                    String::new()
                } else {
                    format!("{ISSUE_SIGN}{id} {title}")
                };
                vec![format!("{ISSUE_PR_TITLE_PREFIX} '{title}' "), body, note]
            }
            IssueReference::Jira { url, .. } => vec![note, format!("[{id}] {title}"), url.clone()],
            IssueReference::FreeForm { .. } => vec![title.to_string(), note],
        };

        Ok(Self {
            name: BranchName(name),
            comments,
        })
    }
}

/// Lower-cases, collapses every run of characters outside `[a-z0-9]` into one
/// hyphen and trims hyphens from both ends. Idempotent.
pub fn clean_from_special_symbols(input: &str) -> String {
    let lowered = input.to_lowercase();
    DISALLOWED_RUN
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
