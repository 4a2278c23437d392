pub mod branch;
pub mod issue;
pub mod note;
pub mod pull_request;
