pub mod dev_branch;
pub mod reaper;
