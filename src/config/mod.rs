//! Static configuration: hosts → teams → repositories
//!
//! Configuration is loaded once at startup and never mutated afterwards.
//! The poller only borrows it.

mod file;

pub use file::{default_config_path, load_config, parse_config, resolve_config_path};

use crate::error::{Error, Result};
use crate::types::HostType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Poll interval used when the config file does not set one (seconds)
pub const POLL_INTERVAL_DEFAULT: u64 = 60;

/// Name used in merge commit titles and as git identity by default
pub const BOT_NAME_DEFAULT: &str = "rebazer";

fn default_poll_interval() -> u64 {
    POLL_INTERVAL_DEFAULT
}

fn default_workspace() -> PathBuf {
    PathBuf::from("rebazer-workspace")
}

fn default_bot_name() -> String {
    BOT_NAME_DEFAULT.to_string()
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebazerConfig {
    /// Idle delay between two sweeps, in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
    /// Directory holding the clones used for rebasing
    #[serde(default = "default_workspace")]
    pub workspace: PathBuf,
    /// Where to persist handled PR versions (in-memory only if unset)
    #[serde(default)]
    pub state_file: Option<PathBuf>,
    /// Bot name for commit titles and the git identity
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
    /// Hosting services to poll
    #[serde(default)]
    pub hosts: Vec<RepositoryHost>,
}

impl RebazerConfig {
    /// Idle delay between sweeps
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    /// Every configured repository together with its owning host and team
    pub fn repositories(
        &self,
    ) -> impl Iterator<Item = (&RepositoryHost, &RepositoryTeam, &RepositoryConfig)> {
        self.hosts.iter().flat_map(|host| {
            host.teams
                .iter()
                .flat_map(move |team| team.repos.iter().map(move |repo| (host, team, repo)))
        })
    }

    /// Check the invariants the poller relies on
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval == 0 {
            return Err(Error::Config("poll_interval must be positive".to_string()));
        }
        if self.bot_name.trim().is_empty() {
            return Err(Error::Config("bot_name must not be empty".to_string()));
        }
        for host in &self.hosts {
            for team in &host.teams {
                if team.name.trim().is_empty() {
                    return Err(Error::Config(format!(
                        "{} host has a team without a name",
                        host.host_type
                    )));
                }
                team.password(host.host_type)?;
                if team.repos.iter().any(|r| r.name.trim().is_empty()) {
                    return Err(Error::Config(format!(
                        "team '{}' has a repository without a name",
                        team.name
                    )));
                }
            }
        }
        if self.repositories().next().is_none() {
            return Err(Error::Config("no repositories configured".to_string()));
        }
        Ok(())
    }
}

/// A hosting service and the teams to poll on it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryHost {
    /// Host family, selects the connector implementation
    #[serde(rename = "type")]
    pub host_type: HostType,
    /// API base override (e.g. GitHub Enterprise)
    #[serde(default)]
    pub url: Option<String>,
    /// Base for clone URLs; derived from the API base if unset
    #[serde(default)]
    pub git_url: Option<String>,
    /// Teams / organizations / groups on this host
    #[serde(default)]
    pub teams: Vec<RepositoryTeam>,
}

impl RepositoryHost {
    /// API base URL without trailing slash
    pub fn api_url(&self) -> String {
        self.url
            .as_deref()
            .unwrap_or_else(|| self.host_type.default_api_url())
            .trim_end_matches('/')
            .to_string()
    }

    /// Base URL that `<team>/<repo>.git` is appended to for cloning
    pub fn git_url(&self) -> Result<String> {
        if let Some(ref git_url) = self.git_url {
            return Ok(git_url.trim_end_matches('/').to_string());
        }

        let api_url = self.api_url();
        let mut url = Url::parse(&api_url)
            .map_err(|e| Error::Config(format!("invalid API url '{api_url}': {e}")))?;
        if url.host_str() == Some("api.github.com") {
            url.set_host(Some("github.com"))
                .map_err(|e| Error::Config(format!("invalid API url '{api_url}': {e}")))?;
        }
        let path = url.path().trim_end_matches('/');
        let web_path = path
            .strip_suffix("/api/v3")
            .or_else(|| path.strip_suffix("/api/v4"))
            .unwrap_or(path)
            .to_string();
        url.set_path(&web_path);
        Ok(url.as_str().trim_end_matches('/').to_string())
    }
}

/// A team (owner, organization, group) and its credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryTeam {
    /// Owner / organization / group path
    pub name: String,
    /// User name for basic auth and clone URLs
    pub user: String,
    /// Password or token; falls back to the host's token environment variable
    #[serde(default)]
    pub pass: Option<String>,
    /// Repositories to poll
    #[serde(default)]
    pub repos: Vec<RepositoryConfig>,
}

impl RepositoryTeam {
    /// Resolve the password, consulting the environment if none is configured
    pub fn password(&self, host_type: HostType) -> Result<String> {
        self.pass
            .clone()
            .or_else(|| std::env::var(host_type.token_env_var()).ok())
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "no password for team '{}': set 'pass' or {}",
                    self.name,
                    host_type.token_env_var()
                ))
            })
    }
}

/// A single repository to poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Repository name (without the team prefix)
    pub name: String,
}

impl std::fmt::Display for RepositoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
