use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Marks the commit-message line that carries a serialized [`Note`].
pub const NOTE_MARKER: &str = "sprout-note:";
const NOTE_VERSION: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchType {
    Dev,
    Pr,
    Other,
}

impl BranchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchType::Dev => "dev",
            BranchType::Pr => "pr",
            BranchType::Other => "other",
        }
    }

    /// Branch role by naming convention: `-dev` and `-pr` suffixes.
    pub fn from_branch_name(name: &str) -> Self {
        if name.ends_with("-dev") {
            BranchType::Dev
        } else if name.ends_with("-pr") {
            BranchType::Pr
        } else {
            BranchType::Other
        }
    }
}

/// Issue linkage metadata embedded as one line of a generated commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub github_url: String,
    pub jira_url: String,
    pub branch_type: BranchType,
    pub title: String,
}

#[derive(Serialize, Deserialize)]
struct NotePayload {
    version: u8,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    github_issue_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    jira_ticket_url: String,
    branch_type: BranchType,
    #[serde(default)]
    title: String,
}

impl Note {
    pub fn new(github_url: &str, jira_url: &str, branch_type: BranchType, title: &str) -> Self {
        Self {
            github_url: github_url.to_string(),
            jira_url: jira_url.to_string(),
            branch_type,
            title: title.to_string(),
        }
    }

    /// Single-line form: the marker followed by compact JSON.
    pub fn serialize(&self) -> AppResult<String> {
        if !self.github_url.is_empty() && !self.jira_url.is_empty() {
            return Err(AppError::InvalidReference(
                "a note links either a GitHub issue or a Jira ticket, not both".to_string(),
            ));
        }
        let payload = NotePayload {
            version: NOTE_VERSION,
            github_issue_url: self.github_url.clone(),
            jira_ticket_url: self.jira_url.clone(),
            branch_type: self.branch_type,
            title: self.title.clone(),
        };
        let json = serde_json::to_string(&payload)
            .map_err(|err| AppError::InvalidReference(format!("failed to encode note: {err}")))?;
        Ok(format!("{NOTE_MARKER}{json}"))
    }

    /// Finds the first note line in `text`. Returns `None` for text without one.
    pub fn parse(text: &str) -> Option<Self> {
        text.lines().find_map(|line| {
            let json = line.trim().strip_prefix(NOTE_MARKER)?;
            let payload: NotePayload = serde_json::from_str(json).ok()?;
            Some(Self {
                github_url: payload.github_issue_url,
                jira_url: payload.jira_ticket_url,
                branch_type: payload.branch_type,
                title: payload.title,
            })
        })
    }
}
