use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AppError, AppResult};

const GITHUB_ISSUE_MARKER: &str = "/issues/";
const JIRA_BROWSE_MARKER: &str = "/browse/";

static JIRA_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Z0-9_]*-[0-9]+$").expect("jira key pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    FreeForm,
    GitHub,
    Jira,
}

/// An issue reference recognised from a command-line argument or clipboard text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueReference {
    FreeForm { text: String },
    GitHub { url: String, number: u64 },
    Jira { url: String, key: String },
}

impl IssueReference {
    /// Classifies raw text: GitHub issue URL, then Jira ticket URL, then free-form text.
    pub fn classify(text: &str) -> AppResult<Self> {
        if text.contains(GITHUB_ISSUE_MARKER) {
            let segment = text.rsplit('/').next().unwrap_or_default();
            let number = segment
                .parse::<u64>()
                .ok()
                .filter(|number| *number > 0)
                .ok_or_else(|| {
                    AppError::InvalidReference(format!(
                        "'{segment}' is not an issue number in {text}"
                    ))
                })?;
            return Ok(Self::GitHub {
                url: text.to_string(),
                number,
            });
        }

        if let Some(key) = jira_key(text) {
            return Ok(Self::Jira {
                url: text.to_string(),
                key,
            });
        }

        Ok(Self::FreeForm {
            text: text.to_string(),
        })
    }

    pub fn kind(&self) -> IssueKind {
        match self {
            Self::FreeForm { .. } => IssueKind::FreeForm,
            Self::GitHub { .. } => IssueKind::GitHub,
            Self::Jira { .. } => IssueKind::Jira,
        }
    }

    pub fn raw_text(&self) -> &str {
        match self {
            Self::FreeForm { text } => text,
            Self::GitHub { url, .. } | Self::Jira { url, .. } => url,
        }
    }

    /// Tracker-specific identifier; empty for free-form text.
    pub fn id(&self) -> String {
        match self {
            Self::FreeForm { .. } => String::new(),
            Self::GitHub { number, .. } => number.to_string(),
            Self::Jira { key, .. } => key.clone(),
        }
    }

    /// `owner/repo` of the repository the GitHub issue lives in.
    pub fn github_repo(&self) -> AppResult<String> {
        let Self::GitHub { url, .. } = self else {
            return Err(AppError::InvalidReference(format!(
                "'{}' is not a GitHub issue",
                self.raw_text()
            )));
        };
        let repo_url = url.split(GITHUB_ISSUE_MARKER).next().unwrap_or_default();
        let parts: Vec<&str> = repo_url.split('/').collect();
        // scheme, empty, host, owner, repo
        match parts.as_slice() {
            [_, _, _, owner, repo, ..] if !owner.is_empty() && !repo.is_empty() => {
                Ok(format!("{owner}/{repo}"))
            }
            _ => Err(AppError::InvalidReference(format!(
                "invalid GitHub URL format: {repo_url}"
            ))),
        }
    }

    /// Jira site root taken from a `.../browse/KEY` URL.
    pub fn jira_base_url(&self) -> Option<&str> {
        match self {
            Self::Jira { url, .. } => url
                .find(JIRA_BROWSE_MARKER)
                .map(|index| &url[..index])
                .filter(|base| base.starts_with("http")),
            _ => None,
        }
    }
}

fn jira_key(text: &str) -> Option<String> {
    let (_, rest) = text.split_once(JIRA_BROWSE_MARKER)?;
    let candidate = rest
        .split(['/', '?', '#', ' '])
        .next()
        .unwrap_or_default()
        .trim();
    JIRA_KEY
        .is_match(candidate)
        .then(|| candidate.to_string())
}
