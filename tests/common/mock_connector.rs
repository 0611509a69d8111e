//! Mock connector and rebase executor for engine tests
//!
//! Not every helper is used by every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use rebazer::config::RepositoryConfig;
use rebazer::connector::RepositoryConnector;
use rebazer::error::{Error, Result};
use rebazer::rebase::RebaseExecutor;
use rebazer::types::{HostType, PullRequest};
use std::collections::HashMap;
use std::sync::Mutex;

/// One recorded connector call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorCall {
    ListPullRequests(String),
    LatestSnapshot(u64),
    IsApproved(u64),
    RebaseNeeded(u64),
    GreenBuildExists(u64),
    Merge(u64),
    AddComment(u64),
}

/// Answers for one PR's predicates
#[derive(Debug, Clone, Copy)]
struct PrState {
    green: bool,
    rebase_needed: bool,
    approved: bool,
}

impl Default for PrState {
    fn default() -> Self {
        Self {
            green: true,
            rebase_needed: false,
            approved: true,
        }
    }
}

/// Mock repository connector
///
/// Features:
/// - Per-PR predicate answers (default: green, up to date, approved)
/// - Refreshed `last_update` returned by `latest_snapshot`
/// - Ordered call log for verification
/// - Error injection per operation
pub struct MockConnector {
    host_type: HostType,
    pull_requests: Mutex<Vec<PullRequest>>,
    states: Mutex<HashMap<u64, PrState>>,
    refreshed: Mutex<HashMap<u64, String>>,
    calls: Mutex<Vec<ConnectorCall>>,
    // Error injection
    error_on_list: Mutex<Option<String>>,
    error_on_merge: Mutex<Option<String>>,
    error_on_comment: Mutex<Option<String>>,
    not_found_on_rebase_needed: Mutex<bool>,
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnector {
    pub fn new() -> Self {
        Self {
            host_type: HostType::GitHub,
            pull_requests: Mutex::new(Vec::new()),
            states: Mutex::new(HashMap::new()),
            refreshed: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            error_on_list: Mutex::new(None),
            error_on_merge: Mutex::new(None),
            error_on_comment: Mutex::new(None),
            not_found_on_rebase_needed: Mutex::new(false),
        }
    }

    // === Responses ===

    /// Set the open pull requests returned by `list_pull_requests`
    pub fn set_pull_requests(&self, prs: Vec<PullRequest>) {
        *self.pull_requests.lock().unwrap() = prs;
    }

    /// Set the predicate answers for a PR
    pub fn set_state(&self, pr_id: u64, green: bool, rebase_needed: bool, approved: bool) {
        self.states.lock().unwrap().insert(
            pr_id,
            PrState {
                green,
                rebase_needed,
                approved,
            },
        );
    }

    /// Make `latest_snapshot` report a newer `last_update` for a PR
    pub fn set_refreshed_last_update(&self, pr_id: u64, last_update: &str) {
        self.refreshed
            .lock()
            .unwrap()
            .insert(pr_id, last_update.to_string());
    }

    // === Error injection ===

    pub fn fail_list(&self, msg: &str) {
        *self.error_on_list.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_merge(&self, msg: &str) {
        *self.error_on_merge.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_comment(&self, msg: &str) {
        *self.error_on_comment.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `rebase_needed` fail as if no common commit existed
    pub fn fail_rebase_needed_not_found(&self) {
        *self.not_found_on_rebase_needed.lock().unwrap() = true;
    }

    // === Verification ===

    pub fn calls(&self) -> Vec<ConnectorCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn merge_calls(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ConnectorCall::Merge(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn comment_calls(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ConnectorCall::AddComment(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Assert the connector was not called at all
    pub fn assert_no_calls(&self) {
        let calls = self.calls();
        assert!(calls.is_empty(), "expected no connector calls, got {calls:?}");
    }

    fn record(&self, call: ConnectorCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn state(&self, pr_id: u64) -> PrState {
        self.states
            .lock()
            .unwrap()
            .get(&pr_id)
            .copied()
            .unwrap_or_default()
    }

    fn injected(slot: &Mutex<Option<String>>) -> Result<()> {
        match slot.lock().unwrap().clone() {
            Some(message) => Err(Error::HostApi {
                host: "mock".to_string(),
                status: 500,
                message,
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RepositoryConnector for MockConnector {
    async fn list_pull_requests(&self, repo: &RepositoryConfig) -> Result<Vec<PullRequest>> {
        self.record(ConnectorCall::ListPullRequests(repo.name.clone()));
        Self::injected(&self.error_on_list)?;
        Ok(self.pull_requests.lock().unwrap().clone())
    }

    async fn latest_snapshot(&self, pr: &PullRequest) -> Result<PullRequest> {
        self.record(ConnectorCall::LatestSnapshot(pr.id));
        Ok(match self.refreshed.lock().unwrap().get(&pr.id) {
            Some(last_update) => pr.with_last_update(last_update.clone()),
            None => pr.clone(),
        })
    }

    async fn is_approved(&self, pr: &PullRequest) -> Result<bool> {
        self.record(ConnectorCall::IsApproved(pr.id));
        Ok(self.state(pr.id).approved)
    }

    async fn rebase_needed(&self, pr: &PullRequest) -> Result<bool> {
        self.record(ConnectorCall::RebaseNeeded(pr.id));
        if *self.not_found_on_rebase_needed.lock().unwrap() {
            return Err(Error::NotFound(
                "no commit shared with the destination branch".to_string(),
            ));
        }
        Ok(self.state(pr.id).rebase_needed)
    }

    async fn green_build_exists(&self, pr: &PullRequest) -> Result<bool> {
        self.record(ConnectorCall::GreenBuildExists(pr.id));
        Ok(self.state(pr.id).green)
    }

    async fn merge(&self, pr: &PullRequest) -> Result<()> {
        self.record(ConnectorCall::Merge(pr.id));
        Self::injected(&self.error_on_merge)
    }

    async fn add_comment(&self, pr: &PullRequest) -> Result<()> {
        self.record(ConnectorCall::AddComment(pr.id));
        Self::injected(&self.error_on_comment)
    }

    fn host_type(&self) -> HostType {
        self.host_type
    }
}

/// Mock rebase executor with a fixed result
pub struct MockRebaser {
    succeed: bool,
    calls: Mutex<Vec<(String, u64)>>,
}

impl MockRebaser {
    pub fn succeeding() -> Self {
        Self {
            succeed: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            succeed: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// (repository, PR id) of every rebase attempt
    pub fn calls(&self) -> Vec<(String, u64)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RebaseExecutor for MockRebaser {
    async fn rebase(&self, repo: &RepositoryConfig, pr: &PullRequest) -> Result<bool> {
        self.calls.lock().unwrap().push((repo.name.clone(), pr.id));
        Ok(self.succeed)
    }
}
