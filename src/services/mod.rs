pub mod console;
pub mod hooks;
pub mod issue_tracker;
pub mod version_control;

pub use console::Console;
pub use hooks::HookInstaller;
pub use issue_tracker::IssueTrackerService;
pub use version_control::VersionControlService;
