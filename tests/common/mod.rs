//! Shared test utilities

#![allow(dead_code)]

pub mod github_fixtures;
pub mod mock_connector;

pub use mock_connector::{ConnectorCall, MockConnector, MockRebaser};

use rebazer::config::RepositoryConfig;
use rebazer::types::PullRequest;

/// Repository config with the given name
pub fn repo(name: &str) -> RepositoryConfig {
    RepositoryConfig {
        name: name.to_string(),
    }
}

/// Pull request `feature-<id> -> main` in `repo` at version `last_update`
pub fn make_pr(repo: &str, id: u64, last_update: &str) -> PullRequest {
    PullRequest {
        id,
        repo: repo.to_string(),
        source: format!("feature-{id}"),
        destination: "main".to_string(),
        url: format!("/repos/acme/{repo}/pulls/{id}"),
        last_update: last_update.to_string(),
    }
}
