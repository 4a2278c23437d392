use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
    Merged,
}

impl PrState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrState::Merged => "merged",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
}

/// What `gh issue develop` needs to attach a branch to a GitHub issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueLink {
    pub issue_repo: String,
    pub issue_number: u64,
    pub branch: String,
    pub branch_repo: String,
    pub base: String,
}
