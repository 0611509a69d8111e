//! Connector factory keyed by host type

use crate::config::{RepositoryHost, RepositoryTeam};
use crate::connector::{GitHubConnector, GitLabConnector, RepositoryConnector};
use crate::error::Result;
use crate::types::HostType;

/// Create the connector for a host/team pair
///
/// Credentials are resolved from the team (or the host's token environment
/// variable) once, here.
pub fn create_connector(
    host: &RepositoryHost,
    team: &RepositoryTeam,
    bot_name: &str,
) -> Result<Box<dyn RepositoryConnector>> {
    let password = team.password(host.host_type)?;
    let api_url = host.api_url();

    match host.host_type {
        HostType::GitHub => Ok(Box::new(GitHubConnector::new(
            &api_url, team, password, bot_name,
        )?)),
        HostType::GitLab => Ok(Box::new(GitLabConnector::new(
            &api_url, team, password, bot_name,
        )?)),
    }
}
