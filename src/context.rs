use std::sync::Arc;

use crate::services::{Console, HookInstaller, IssueTrackerService, VersionControlService};

#[derive(Clone)]
pub struct AppContext {
    pub version_control: Arc<dyn VersionControlService>,
    pub issue_tracker: Arc<dyn IssueTrackerService>,
    pub hooks: Arc<dyn HookInstaller>,
    pub console: Arc<dyn Console>,
}

impl AppContext {
    pub fn new(
        version_control: Arc<dyn VersionControlService>,
        issue_tracker: Arc<dyn IssueTrackerService>,
        hooks: Arc<dyn HookInstaller>,
        console: Arc<dyn Console>,
    ) -> Self {
        Self {
            version_control,
            issue_tracker,
            hooks,
            console,
        }
    }
}
