//! GitLab connector implementation

use crate::config::{RepositoryConfig, RepositoryTeam};
use crate::connector::{
    DEFAULT_TIMEOUT_SECS, MANUAL_ATTENTION_NOTICE, RepositoryConnector, ensure_success,
    last_common_commit, merge_commit_title,
};
use crate::error::{Error, Result};
use crate::types::{HostType, PullRequest};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// GitLab connector using API v4 with a private token
pub struct GitLabConnector {
    client: Client,
    api_url: String,
    team: String,
    token: String,
    bot_name: String,
}

#[derive(Deserialize)]
struct MergeRequest {
    iid: u64,
    source_branch: String,
    target_branch: String,
    updated_at: String,
}

#[derive(Deserialize)]
struct MrUpdatedAt {
    updated_at: String,
}

/// MR approvals response
#[derive(Deserialize)]
struct MrApprovals {
    approved: bool,
}

#[derive(Deserialize)]
struct MrCommit {
    id: String,
    #[serde(default)]
    parent_ids: Vec<String>,
}

#[derive(Deserialize)]
struct Branch {
    commit: BranchCommit,
}

#[derive(Deserialize)]
struct BranchCommit {
    id: String,
}

/// Commit status
#[derive(Deserialize)]
struct CommitStatus {
    status: String, // "success", "failed", "running", "pending", ...
}

/// Page size requested for MR listings
const PAGE_SIZE: u32 = 100;

impl GitLabConnector {
    /// Create a connector for one group/namespace
    pub fn new(api_url: &str, team: &RepositoryTeam, token: String, bot_name: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(bot_name)
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            team: team.name.clone(),
            token,
            bot_name: bot_name.to_string(),
        })
    }

    fn project_path(&self, repo: &str) -> String {
        let project = format!("{}/{}", self.team, repo);
        format!("/projects/{}", urlencoding::encode(&project))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.api_url, path))
            .header("PRIVATE-TOKEN", &self.token)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path).send().await?;
        let response = ensure_success(HostType::GitLab, response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn head_of_branch(&self, pr: &PullRequest) -> Result<String> {
        let path = format!(
            "{}/repository/branches/{}",
            self.project_path(&pr.repo),
            urlencoding::encode(&pr.destination)
        );
        let branch: Branch = self.get_json(&path).await?;
        Ok(branch.commit.id)
    }

    async fn last_common_commit(&self, pr: &PullRequest) -> Result<String> {
        let mut commits: Vec<MrCommit> = self.get_json(&format!("{}/commits", pr.url)).await?;
        // GitLab lists newest first
        commits.reverse();

        let mut known = Vec::new();
        let mut parents = Vec::new();
        for commit in commits {
            known.push(commit.id);
            known.extend(commit.parent_ids.iter().cloned());
            parents.extend(commit.parent_ids);
        }
        last_common_commit(&known, &parents)
    }
}

#[async_trait]
impl RepositoryConnector for GitLabConnector {
    async fn list_pull_requests(&self, repo: &RepositoryConfig) -> Result<Vec<PullRequest>> {
        let path = format!("{}/merge_requests", self.project_path(&repo.name));
        debug!(team = %self.team, repo = %repo.name, "listing merge requests");

        let mrs: Vec<MergeRequest> = self
            .get_json(&format!("{path}?state=opened&per_page={PAGE_SIZE}"))
            .await?;

        let result: Vec<PullRequest> = mrs
            .into_iter()
            .map(|mr| PullRequest {
                id: mr.iid,
                repo: repo.name.clone(),
                source: mr.source_branch,
                destination: mr.target_branch,
                url: format!("{path}/{}", mr.iid),
                last_update: mr.updated_at,
            })
            .collect();
        debug!(repo = %repo.name, count = result.len(), "listed merge requests");
        Ok(result)
    }

    async fn latest_snapshot(&self, pr: &PullRequest) -> Result<PullRequest> {
        let current: MrUpdatedAt = self.get_json(&pr.url).await?;
        debug!(mr_iid = pr.id, last_update = %current.updated_at, "refreshed merge request");
        Ok(pr.with_last_update(current.updated_at))
    }

    async fn is_approved(&self, pr: &PullRequest) -> Result<bool> {
        let approvals: MrApprovals = self.get_json(&format!("{}/approvals", pr.url)).await?;
        debug!(mr_iid = pr.id, approved = approvals.approved, "checked approval");
        Ok(approvals.approved)
    }

    async fn rebase_needed(&self, pr: &PullRequest) -> Result<bool> {
        let common = self.last_common_commit(pr).await?;
        let head = self.head_of_branch(pr).await?;
        debug!(mr_iid = pr.id, %common, %head, "compared fork point with target head");
        Ok(common != head)
    }

    async fn green_build_exists(&self, pr: &PullRequest) -> Result<bool> {
        let path = format!(
            "{}/repository/commits/{}/statuses",
            self.project_path(&pr.repo),
            urlencoding::encode(&pr.source)
        );
        let statuses: Vec<CommitStatus> = self.get_json(&path).await?;

        let green = statuses.iter().any(|s| s.status == "success");
        debug!(mr_iid = pr.id, statuses = statuses.len(), green, "checked build status");
        Ok(green)
    }

    async fn merge(&self, pr: &PullRequest) -> Result<()> {
        warn!(mr_iid = pr.id, repo = %pr.repo, "merging merge request");
        let body = serde_json::json!({
            "merge_commit_message": merge_commit_title(pr, &self.bot_name),
            "squash": false,
        });

        let response = self
            .request(Method::PUT, &format!("{}/merge", pr.url))
            .json(&body)
            .send()
            .await?;
        ensure_success(HostType::GitLab, response).await?;

        debug!(mr_iid = pr.id, "merge complete");
        Ok(())
    }

    async fn add_comment(&self, pr: &PullRequest) -> Result<()> {
        debug!(mr_iid = pr.id, "creating MR comment");
        let response = self
            .request(Method::POST, &format!("{}/notes", pr.url))
            .json(&serde_json::json!({ "body": MANUAL_ATTENTION_NOTICE }))
            .send()
            .await?;
        ensure_success(HostType::GitLab, response).await?;

        debug!(mr_iid = pr.id, "created MR comment");
        Ok(())
    }

    fn host_type(&self) -> HostType {
        HostType::GitLab
    }
}
