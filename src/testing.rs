//! In-memory gateways for workflow tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::context::AppContext;
use crate::domain::branch::BranchName;
use crate::domain::issue::IssueReference;
use crate::domain::pull_request::{IssueLink, PrState, PullRequest};
use crate::error::{AppError, AppResult};
use crate::services::{Console, HookInstaller, IssueTrackerService, VersionControlService};

#[derive(Default)]
pub struct RepoState {
    pub current: String,
    pub main: String,
    pub dirty: bool,
    pub stash_depth: usize,
    pub local: HashSet<String>,
    pub remote: HashSet<String>,
    pub tracking: Vec<String>,
    pub remotes: HashSet<String>,
    pub messages: HashMap<String, Vec<String>>,
    pub commits: HashMap<String, Vec<String>>,
    pub fail_deletes: HashSet<String>,
    pub calls: Vec<String>,
}

pub struct FakeVcs {
    pub state: Mutex<RepoState>,
}

impl FakeVcs {
    pub fn on_main() -> Self {
        let mut state = RepoState {
            current: "main".to_string(),
            main: "main".to_string(),
            ..RepoState::default()
        };
        state.local.insert("main".to_string());
        state.remotes.insert("origin".to_string());
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn with(self, edit: impl FnOnce(&mut RepoState)) -> Self {
        edit(&mut self.state.lock().unwrap());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls that change repository or remote state.
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| {
                ["stash", "unstash", "create", "checkout", "add_remote", "delete"]
                    .iter()
                    .any(|verb| call.split(' ').next() == Some(*verb))
            })
            .collect()
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl VersionControlService for FakeVcs {
    async fn current_branch(&self) -> AppResult<String> {
        Ok(self.state.lock().unwrap().current.clone())
    }

    async fn main_branch_name(&self) -> AppResult<String> {
        Ok(self.state.lock().unwrap().main.clone())
    }

    async fn has_uncommitted_changes(&self) -> AppResult<bool> {
        Ok(self.state.lock().unwrap().dirty)
    }

    async fn stash(&self) -> AppResult<()> {
        self.record("stash".to_string());
        let mut state = self.state.lock().unwrap();
        state.dirty = false;
        state.stash_depth += 1;
        Ok(())
    }

    async fn unstash(&self) -> AppResult<()> {
        self.record("unstash".to_string());
        let mut state = self.state.lock().unwrap();
        if state.stash_depth == 0 {
            return Err(AppError::VcsOperationFailed("no stash entries".to_string()));
        }
        state.stash_depth -= 1;
        state.dirty = true;
        Ok(())
    }

    async fn fast_forward(&self, branch: &str, remote: &str) -> AppResult<()> {
        self.record(format!("fast_forward {branch} {remote}"));
        Ok(())
    }

    async fn checkout(&self, branch: &str) -> AppResult<()> {
        self.record(format!("checkout {branch}"));
        self.state.lock().unwrap().current = branch.to_string();
        Ok(())
    }

    async fn create_branch(
        &self,
        name: &BranchName,
        from: &str,
        notes: &[String],
    ) -> AppResult<()> {
        self.record(format!("create {name} {from}"));
        let mut state = self.state.lock().unwrap();
        state.local.insert(name.0.clone());
        state.remote.insert(name.0.clone());
        state.commits.insert(name.0.clone(), notes.to_vec());
        state.current = name.0.clone();
        Ok(())
    }

    async fn branch_exists_local(&self, name: &str) -> AppResult<bool> {
        Ok(self.state.lock().unwrap().local.contains(name))
    }

    async fn branch_exists_remote(&self, _remote: &str, name: &str) -> AppResult<bool> {
        Ok(self.state.lock().unwrap().remote.contains(name))
    }

    async fn remote_exists(&self, name: &str) -> AppResult<bool> {
        Ok(self.state.lock().unwrap().remotes.contains(name))
    }

    async fn add_remote(&self, name: &str, url: &str) -> AppResult<()> {
        self.record(format!("add_remote {name} {url}"));
        self.state.lock().unwrap().remotes.insert(name.to_string());
        Ok(())
    }

    async fn delete_branch(&self, name: &str) -> AppResult<()> {
        self.record(format!("delete {name}"));
        let mut state = self.state.lock().unwrap();
        if state.fail_deletes.contains(name) {
            return Err(AppError::VcsOperationFailed(format!(
                "remote rejected deletion of {name}"
            )));
        }
        state.local.remove(name);
        state.remote.remove(name);
        state.tracking.retain(|branch| branch != name);
        Ok(())
    }

    async fn branches_tracking_remote(&self, _remote: &str) -> AppResult<Vec<String>> {
        Ok(self.state.lock().unwrap().tracking.clone())
    }

    async fn branch_messages(&self, branch: &str, _base: &str) -> AppResult<Vec<String>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .messages
            .get(branch)
            .cloned()
            .unwrap_or_default())
    }

    async fn repo_slug(&self, _remote: &str) -> AppResult<String> {
        Ok("me/repo".to_string())
    }

    async fn root_dir(&self) -> AppResult<PathBuf> {
        Ok(PathBuf::from("/repo"))
    }
}

#[derive(Default)]
pub struct FakeTracker {
    pub parent: Option<String>,
    pub titles: HashMap<String, String>,
    /// `repo branch` pairs with a merged pull request.
    pub merged: HashSet<String>,
    pub fail_link: bool,
    pub links: Mutex<Vec<IssueLink>>,
    pub pr_queries: Mutex<Vec<String>>,
}

impl FakeTracker {
    pub fn merged(mut self, repo: &str, branch: &str) -> Self {
        self.merged.insert(format!("{repo} {branch}"));
        self
    }
}

#[async_trait]
impl IssueTrackerService for FakeTracker {
    async fn fetch_issue_title(&self, issue: &IssueReference) -> AppResult<String> {
        if let IssueReference::FreeForm { text } = issue {
            return Ok(text.clone());
        }
        self.titles
            .get(&issue.id())
            .cloned()
            .ok_or_else(|| AppError::TrackerUnavailable(format!("no issue {}", issue.id())))
    }

    async fn link_branch_to_issue(&self, link: &IssueLink) -> AppResult<()> {
        if self.fail_link {
            return Err(AppError::TrackerUnavailable("gh issue develop failed".to_string()));
        }
        self.links.lock().unwrap().push(link.clone());
        Ok(())
    }

    async fn find_pull_request(
        &self,
        repo: &str,
        branch: &str,
        state: PrState,
    ) -> AppResult<Option<PullRequest>> {
        self.pr_queries.lock().unwrap().push(branch.to_string());
        let key = format!("{repo} {branch}");
        Ok((state == PrState::Merged && self.merged.contains(&key)).then(|| PullRequest {
            number: 1,
            url: String::new(),
            title: branch.to_string(),
        }))
    }

    async fn parent_repo(&self) -> AppResult<Option<String>> {
        Ok(self.parent.clone())
    }
}

#[derive(Default)]
pub struct FakeHooks {
    pub fail: bool,
    pub installed: Mutex<Vec<PathBuf>>,
}

impl HookInstaller for FakeHooks {
    fn ensure_hook_installed(&self, root: &Path) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Io(std::io::Error::other("read-only hooks dir")));
        }
        self.installed.lock().unwrap().push(root.to_path_buf());
        Ok(())
    }

    fn refresh_large_file_hook(&self, _root: &Path) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Io(std::io::Error::other("read-only hooks dir")));
        }
        Ok(())
    }
}

/// Answers prompts from a script; an exhausted script answers "no".
#[derive(Default)]
pub struct ScriptedConsole {
    answers: Mutex<VecDeque<bool>>,
    stdin_closed: bool,
    pub lines: Mutex<Vec<String>>,
    pub questions: Mutex<Vec<String>>,
}

impl ScriptedConsole {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            ..Self::default()
        }
    }

    /// Answers as scripted, then fails every further prompt as if stdin were closed.
    pub fn closing_after(answers: &[bool]) -> Self {
        Self {
            stdin_closed: true,
            ..Self::answering(answers)
        }
    }

    pub fn output(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl Console for ScriptedConsole {
    fn say(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }

    fn confirm(&self, question: &str) -> AppResult<bool> {
        self.questions.lock().unwrap().push(question.to_string());
        match self.answers.lock().unwrap().pop_front() {
            Some(answer) => Ok(answer),
            None if self.stdin_closed => Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "stdin closed",
            ))),
            None => Ok(false),
        }
    }
}

pub struct Harness {
    pub vcs: Arc<FakeVcs>,
    pub tracker: Arc<FakeTracker>,
    pub hooks: Arc<FakeHooks>,
    pub console: Arc<ScriptedConsole>,
}

impl Harness {
    pub fn new(vcs: FakeVcs, tracker: FakeTracker, console: ScriptedConsole) -> Self {
        Self::with_hooks(vcs, tracker, FakeHooks::default(), console)
    }

    pub fn with_hooks(
        vcs: FakeVcs,
        tracker: FakeTracker,
        hooks: FakeHooks,
        console: ScriptedConsole,
    ) -> Self {
        Self {
            vcs: Arc::new(vcs),
            tracker: Arc::new(tracker),
            hooks: Arc::new(hooks),
            console: Arc::new(console),
        }
    }

    pub fn context(&self) -> AppContext {
        AppContext::new(
            self.vcs.clone(),
            self.tracker.clone(),
            self.hooks.clone(),
            self.console.clone(),
        )
    }
}
