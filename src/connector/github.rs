//! GitHub connector implementation

use crate::config::{RepositoryConfig, RepositoryTeam};
use crate::connector::{
    DEFAULT_TIMEOUT_SECS, MANUAL_ATTENTION_NOTICE, RepositoryConnector, last_common_commit,
    merge_commit_title,
};
use crate::error::{Error, Result};
use crate::types::{HostType, PullRequest};
use async_trait::async_trait;
use chrono::SecondsFormat;
use octocrab::models::pulls::ReviewState;
use octocrab::params::State;
use octocrab::params::pulls::MergeMethod;
use octocrab::{Octocrab, Page};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

// Octocrab has no typed call for these three, so they go through `Octocrab::get`

#[derive(Deserialize)]
struct ApiCommit {
    sha: String,
    #[serde(default)]
    parents: Vec<ApiSha>,
}

#[derive(Deserialize)]
struct ApiSha {
    sha: String,
}

#[derive(Deserialize)]
struct ApiGitRef {
    object: ApiSha,
}

#[derive(Deserialize)]
struct ApiCombinedStatus {
    #[serde(default)]
    statuses: Vec<ApiStatus>,
}

#[derive(Deserialize)]
struct ApiStatus {
    state: String,
}

/// Page size requested for listings
const PAGE_SIZE: u8 = 100;

/// GitHub connector using octocrab with basic auth
pub struct GitHubConnector {
    client: Octocrab,
    team: String,
    bot_name: String,
}

impl GitHubConnector {
    /// Create a connector for one team against the API at `api_url`
    pub fn new(
        api_url: &str,
        team: &RepositoryTeam,
        password: String,
        bot_name: &str,
    ) -> Result<Self> {
        Self::with_timeout(
            api_url,
            team,
            password,
            bot_name,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Like [`GitHubConnector::new`] with an explicit connect and read timeout
    pub(crate) fn with_timeout(
        api_url: &str,
        team: &RepositoryTeam,
        password: String,
        bot_name: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let timeout = Some(timeout);
        let client = Octocrab::builder()
            .base_uri(api_url)
            .map_err(|e| Error::Config(format!("invalid GitHub API url '{api_url}': {e}")))?
            .basic_auth(team.user.clone(), password)
            .set_connect_timeout(timeout)
            .set_read_timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to create GitHub client: {e}")))?;

        Ok(Self {
            client,
            team: team.name.clone(),
            bot_name: bot_name.to_string(),
        })
    }

    fn repo_path(&self, repo: &str) -> String {
        format!("/repos/{}/{}", self.team, repo)
    }

    /// SHA the destination branch currently points to
    async fn head_of_branch(&self, pr: &PullRequest) -> Result<String> {
        let route = format!(
            "{}/git/ref/heads/{}",
            self.repo_path(&pr.repo),
            encode_branch(&pr.destination)
        );
        let git_ref: ApiGitRef = self.client.get(route, None::<&()>).await?;
        Ok(git_ref.object.sha)
    }

    /// Fork point of the PR as reported by its commit listing
    async fn last_common_commit(&self, pr: &PullRequest) -> Result<String> {
        let first: Page<ApiCommit> = self
            .client
            .get(format!("{}/commits", pr.url), Some(&[("per_page", PAGE_SIZE)][..]))
            .await?;
        let commits = self.client.all_pages(first).await?;

        // Parents count as known too, so the oldest commit's parent is found
        let mut known = Vec::new();
        let mut parents = Vec::new();
        for commit in commits {
            known.push(commit.sha);
            for parent in commit.parents {
                known.push(parent.sha.clone());
                parents.push(parent.sha);
            }
        }
        last_common_commit(&known, &parents)
    }
}

/// Percent-encode each path segment of a branch name, keeping the slashes
fn encode_branch(branch: &str) -> String {
    branch
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// `updated_at` rendered the way GitHub sends it
fn update_token(pr: &octocrab::models::pulls::PullRequest) -> String {
    pr.updated_at
        .map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        .unwrap_or_default()
}

#[async_trait]
impl RepositoryConnector for GitHubConnector {
    async fn list_pull_requests(&self, repo: &RepositoryConfig) -> Result<Vec<PullRequest>> {
        debug!(team = %self.team, repo = %repo.name, "listing pull requests");

        let first = self
            .client
            .pulls(&self.team, &repo.name)
            .list()
            .state(State::Open)
            .per_page(PAGE_SIZE)
            .send()
            .await?;
        let pulls = self.client.all_pages(first).await?;

        let path = self.repo_path(&repo.name);
        let result: Vec<PullRequest> = pulls
            .iter()
            .map(|p| PullRequest {
                id: p.number,
                repo: repo.name.clone(),
                source: p.head.ref_field.clone(),
                destination: p.base.ref_field.clone(),
                url: format!("{path}/pulls/{}", p.number),
                last_update: update_token(p),
            })
            .collect();
        debug!(repo = %repo.name, count = result.len(), "listed pull requests");
        Ok(result)
    }

    async fn latest_snapshot(&self, pr: &PullRequest) -> Result<PullRequest> {
        let current = self
            .client
            .pulls(&self.team, &pr.repo)
            .get(pr.id)
            .await?;
        let last_update = update_token(&current);
        debug!(pr = pr.id, %last_update, "refreshed pull request");
        Ok(pr.with_last_update(last_update))
    }

    async fn is_approved(&self, pr: &PullRequest) -> Result<bool> {
        let first = self
            .client
            .pulls(&self.team, &pr.repo)
            .list_reviews(pr.id)
            .per_page(PAGE_SIZE)
            .send()
            .await?;
        let reviews = self.client.all_pages(first).await?;

        // Only the most recent review counts
        let approved = reviews
            .last()
            .is_some_and(|r| r.state == Some(ReviewState::Approved));
        debug!(pr = pr.id, reviews = reviews.len(), approved, "checked approval");
        Ok(approved)
    }

    async fn rebase_needed(&self, pr: &PullRequest) -> Result<bool> {
        let common = self.last_common_commit(pr).await?;
        let head = self.head_of_branch(pr).await?;
        debug!(pr = pr.id, %common, %head, "compared fork point with destination head");
        Ok(common != head)
    }

    async fn green_build_exists(&self, pr: &PullRequest) -> Result<bool> {
        let route = format!(
            "{}/commits/{}/status",
            self.repo_path(&pr.repo),
            encode_branch(&pr.source)
        );
        let combined: ApiCombinedStatus = self.client.get(route, None::<&()>).await?;

        let green = combined.statuses.iter().any(|s| s.state == "success");
        debug!(pr = pr.id, statuses = combined.statuses.len(), green, "checked build status");
        Ok(green)
    }

    async fn merge(&self, pr: &PullRequest) -> Result<()> {
        warn!(pr = pr.id, repo = %pr.repo, "merging pull request");

        let result = self
            .client
            .pulls(&self.team, &pr.repo)
            .merge(pr.id)
            .title(merge_commit_title(pr, &self.bot_name))
            .method(MergeMethod::Merge)
            .send()
            .await?;

        debug!(pr = pr.id, merged = result.merged, sha = ?result.sha, "merge complete");
        Ok(())
    }

    async fn add_comment(&self, pr: &PullRequest) -> Result<()> {
        debug!(pr = pr.id, "creating PR comment");
        self.client
            .issues(&self.team, &pr.repo)
            .create_comment(pr.id, MANUAL_ATTENTION_NOTICE)
            .await?;
        debug!(pr = pr.id, "created PR comment");
        Ok(())
    }

    fn host_type(&self) -> HostType {
        HostType::GitHub
    }
}
