pub mod git;
pub mod github;
pub mod hooks;
pub mod jira;
pub mod terminal;
pub mod tracker;
