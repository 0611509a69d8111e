//! Rebasing a pull request's source branch onto its destination
//!
//! The engine only needs a yes/no answer; how the branch is rewritten and
//! pushed is up to the implementation.

mod git;

pub use git::{CommitIdentity, GitRebaseExecutor};

use crate::config::RepositoryConfig;
use crate::error::Result;
use crate::types::PullRequest;
use async_trait::async_trait;

/// Rebase-and-push capability
#[async_trait]
pub trait RebaseExecutor: Send + Sync {
    /// Rebase `pr.source` onto `pr.destination` and push it
    ///
    /// Conflicts and rejected pushes return `Ok(false)`. Errors are reserved
    /// for failures to run the rebase at all.
    async fn rebase(&self, repo: &RepositoryConfig, pr: &PullRequest) -> Result<bool>;
}
