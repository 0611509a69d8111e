//! Idempotency cache of handled pull request versions
//!
//! An entry means "this exact version was already evaluated", never
//! "do not process again": a new `last_update` always gets a fresh look.

mod storage;

pub use storage::{HandledEntry, TRACKING_VERSION, TrackingSnapshot, load_store, save_store};

use crate::config::RepositoryConfig;
use crate::types::PullRequest;
use std::collections::HashMap;

/// Last handled `last_update` token per (repository, PR id)
#[derive(Debug, Clone, Default)]
pub struct PullRequestLastUpdateStore {
    entries: HashMap<(String, u64), String>,
}

impl PullRequestLastUpdateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn key(repo: &RepositoryConfig, pr: &PullRequest) -> (String, u64) {
        (repo.name.clone(), pr.id)
    }

    /// True iff this exact version of the PR was already handled
    pub fn is_handled(&self, repo: &RepositoryConfig, pr: &PullRequest) -> bool {
        self.last_handled(repo, pr) == Some(pr.last_update.as_str())
    }

    /// Token recorded for this PR, if any
    pub fn last_handled(&self, repo: &RepositoryConfig, pr: &PullRequest) -> Option<&str> {
        self.entries
            .get(&Self::key(repo, pr))
            .map(String::as_str)
    }

    /// Record the PR's current version as handled, replacing any older one
    pub fn set_handled(&mut self, repo: &RepositoryConfig, pr: &PullRequest) {
        self.entries
            .insert(Self::key(repo, pr), pr.last_update.clone());
    }

    /// Forget every PR of this repository
    pub fn reset_all_in_this_repo(&mut self, repo: &RepositoryConfig) {
        self.entries.retain(|(name, _), _| *name != repo.name);
    }

    /// Number of recorded PRs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, sorted by repository and PR id
    pub fn entries(&self) -> Vec<HandledEntry> {
        let mut entries: Vec<HandledEntry> = self
            .entries
            .iter()
            .map(|((repo, id), last_update)| HandledEntry {
                repo: repo.clone(),
                id: *id,
                last_update: last_update.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.repo.cmp(&b.repo).then(a.id.cmp(&b.id)));
        entries
    }
}

impl FromIterator<HandledEntry> for PullRequestLastUpdateStore {
    fn from_iter<I: IntoIterator<Item = HandledEntry>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|e| ((e.repo, e.id), e.last_update))
                .collect(),
        }
    }
}
