//! Core types for rebazer

use serde::{Deserialize, Serialize};

/// A snapshot of an open pull request / merge request
///
/// Snapshots are immutable. Two snapshots describe the same version of a PR
/// iff their `last_update` tokens are equal; the token is never ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Host-assigned number, unique within a repository
    pub id: u64,
    /// Repository name
    pub repo: String,
    /// Source (head) branch name
    pub source: String,
    /// Destination (base) branch name
    pub destination: String,
    /// API path used for follow-up requests about this PR
    pub url: String,
    /// Opaque host update token (e.g. `updated_at`)
    pub last_update: String,
}

impl PullRequest {
    /// Copy of this snapshot carrying a newer update token
    #[must_use]
    pub fn with_last_update(&self, last_update: String) -> Self {
        Self {
            last_update,
            ..self.clone()
        }
    }
}

impl std::fmt::Display for PullRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PR #{} in {} ({} -> {})",
            self.id, self.repo, self.source, self.destination
        )
    }
}

/// Hosting service family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostType {
    /// GitHub or GitHub Enterprise
    GitHub,
    /// GitLab or self-hosted GitLab
    GitLab,
}

impl HostType {
    /// Default REST API base for this host family
    pub const fn default_api_url(self) -> &'static str {
        match self {
            Self::GitHub => "https://api.github.com",
            Self::GitLab => "https://gitlab.com/api/v4",
        }
    }

    /// Environment variable consulted when a team has no password configured
    pub const fn token_env_var(self) -> &'static str {
        match self {
            Self::GitHub => "GITHUB_TOKEN",
            Self::GitLab => "GITLAB_TOKEN",
        }
    }
}

impl std::fmt::Display for HostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GitHub => write!(f, "GitHub"),
            Self::GitLab => write!(f, "GitLab"),
        }
    }
}

/// Terminal state reached by one evaluation of a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Same version was already evaluated; nothing done
    Unchanged,
    /// No successful build yet; version recorded
    AwaitingGreenBuild,
    /// Rebase pushed; the host will report a new version
    Rebased,
    /// Rebase failed; comment posted and refreshed version recorded
    RebaseFailed,
    /// Not approved yet; version recorded
    AwaitingApproval,
    /// Merged; all cached versions for the repository dropped
    Merged,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unchanged => write!(f, "unchanged"),
            Self::AwaitingGreenBuild => write!(f, "awaiting green build"),
            Self::Rebased => write!(f, "rebased"),
            Self::RebaseFailed => write!(f, "rebase failed"),
            Self::AwaitingApproval => write!(f, "awaiting approval"),
            Self::Merged => write!(f, "merged"),
        }
    }
}
