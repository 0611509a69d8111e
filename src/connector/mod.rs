//! Host connectors for GitHub and GitLab
//!
//! Provides a uniform interface over the hosting services' pull request APIs.

mod ancestry;
mod factory;
mod github;
mod gitlab;

pub use ancestry::last_common_commit;
pub use factory::create_connector;
pub use github::GitHubConnector;
pub use gitlab::GitLabConnector;

use crate::config::RepositoryConfig;
use crate::error::{Error, Result};
use crate::types::{HostType, PullRequest};
use async_trait::async_trait;

/// Request timeout shared by the host clients, in seconds
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Comment posted when a pull request cannot be rebased automatically
pub const MANUAL_ATTENTION_NOTICE: &str =
    "This pull request could not be rebased automatically and needs some manual attention.";

/// Capability interface over one hosting service
///
/// Every method reports host facts as they are right now; nothing is cached.
/// Transport and API failures are returned as errors and never retried here.
#[async_trait]
pub trait RepositoryConnector: Send + Sync {
    /// All currently open pull requests of a repository, in host order
    async fn list_pull_requests(&self, repo: &RepositoryConfig) -> Result<Vec<PullRequest>>;

    /// Refetch a pull request; same identity, current `last_update`
    async fn latest_snapshot(&self, pr: &PullRequest) -> Result<PullRequest>;

    /// Whether the host's approval policy is satisfied
    async fn is_approved(&self, pr: &PullRequest) -> Result<bool>;

    /// Whether the source branch is not based on the destination's current tip
    ///
    /// Fails with [`Error::NotFound`] when no common commit can be determined.
    async fn rebase_needed(&self, pr: &PullRequest) -> Result<bool>;

    /// Whether at least one status check on the source branch succeeded
    async fn green_build_exists(&self, pr: &PullRequest) -> Result<bool>;

    /// Merge the pull request with a merge commit
    async fn merge(&self, pr: &PullRequest) -> Result<()>;

    /// Post [`MANUAL_ATTENTION_NOTICE`] on the pull request
    async fn add_comment(&self, pr: &PullRequest) -> Result<()>;

    /// Host family of this connector
    fn host_type(&self) -> HostType;
}

/// Merge commit title shared by all connectors
pub fn merge_commit_title(pr: &PullRequest, bot_name: &str) -> String {
    format!(
        "Merged in {} (pull request #{}) by {}",
        pr.source, pr.id, bot_name
    )
}

/// Turn a non-success response into [`Error::HostApi`]
pub(crate) async fn ensure_success(
    host: HostType,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(Error::HostApi {
        host: host.to_string(),
        status: status.as_u16(),
        message: format!("{url}: {}", body.trim()),
    })
}
