use crate::error::AppResult;

/// Progress output and yes/no prompts for the operator.
pub trait Console: Send + Sync {
    fn say(&self, line: &str);
    fn confirm(&self, question: &str) -> AppResult<bool>;
}
