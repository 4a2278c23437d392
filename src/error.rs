use std::fmt;
use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid issue reference: {0}")]
    InvalidReference(String),
    #[error("issue tracker unavailable: {0}")]
    TrackerUnavailable(String),
    #[error("switch to main branch '{main}' before creating a dev branch; you are in '{current}'")]
    NotOnMainBranch { current: String, main: String },
    #[error(
        "you are in {repo} with an upstream remote but no fork detected; fork the repository first"
    )]
    MissingForkConfiguration { repo: String },
    #[error("branch '{0}' already exists")]
    BranchAlreadyExists(String),
    #[error("version control error: {0}")]
    VcsOperationFailed(String),
    #[error("failed to delete {} branch(es):\n{}", .0.len(), FailureList(.0))]
    PartialDeletionFailure(Vec<BranchFailure>),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchFailure {
    pub branch: String,
    pub reason: String,
}

struct FailureList<'a>(&'a [BranchFailure]);

impl fmt::Display for FailureList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, failure) in self.0.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "  {}: {}", failure.branch, failure.reason)?;
        }
        Ok(())
    }
}

pub type AppResult<T> = Result<T, AppError>;
