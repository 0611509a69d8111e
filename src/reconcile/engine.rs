//! Per-pull-request decision logic
//!
//! Each PR is judged from scratch on every sweep using what the host reports
//! right now. The only memory is the [`PullRequestLastUpdateStore`], which
//! records the last version looked at, not the decision taken.

use crate::config::RepositoryConfig;
use crate::connector::RepositoryConnector;
use crate::error::Result;
use crate::rebase::RebaseExecutor;
use crate::tracking::PullRequestLastUpdateStore;
use crate::types::{Outcome, PullRequest};
use tracing::{debug, info, warn};

/// Evaluate one pull request and perform whatever it is ready for
///
/// Checks run in a fixed priority order and the first match wins:
/// 1. already handled at this version → nothing
/// 2. no green build → record version
/// 3. rebase needed → rebase; on failure comment and record the refreshed version
/// 4. not approved → record version
/// 5. otherwise → merge and forget every version recorded for the repository
///
/// Host errors propagate unchanged. A failed merge leaves the store untouched
/// so the next sweep tries again.
pub async fn handle_pull_request(
    connector: &dyn RepositoryConnector,
    rebaser: &dyn RebaseExecutor,
    store: &mut PullRequestLastUpdateStore,
    repo: &RepositoryConfig,
    pr: &PullRequest,
) -> Result<Outcome> {
    debug!(repo = %repo.name, pr = pr.id, last_update = %pr.last_update, "processing");

    if store.is_handled(repo, pr) {
        info!(
            repo = %repo.name,
            pr = pr.id,
            last_change = store.last_handled(repo, pr).unwrap_or_default(),
            "unchanged since last run"
        );
        return Ok(Outcome::Unchanged);
    }

    if !connector.green_build_exists(pr).await? {
        info!(repo = %repo.name, pr = pr.id, "waiting for green build");
        store.set_handled(repo, pr);
        return Ok(Outcome::AwaitingGreenBuild);
    }

    if connector.rebase_needed(pr).await? {
        if rebaser.rebase(repo, pr).await? {
            info!(repo = %repo.name, pr = pr.id, "rebased, waiting for the host to pick it up");
            return Ok(Outcome::Rebased);
        }

        warn!(repo = %repo.name, pr = pr.id, "rebase failed, asking for manual attention");
        connector.add_comment(pr).await?;
        // Commenting bumps last_update, so record the version after the comment
        let latest = connector.latest_snapshot(pr).await?;
        store.set_handled(repo, &latest);
        return Ok(Outcome::RebaseFailed);
    }

    if !connector.is_approved(pr).await? {
        info!(repo = %repo.name, pr = pr.id, "waiting for approval");
        store.set_handled(repo, pr);
        return Ok(Outcome::AwaitingApproval);
    }

    info!(repo = %repo.name, pr = pr.id, "merging");
    connector.merge(pr).await?;
    store.reset_all_in_this_repo(repo);
    Ok(Outcome::Merged)
}

/// Evaluate every open pull request of one repository, in host order
///
/// Stops at the first error; PRs already evaluated keep their effects.
pub async fn handle_repository(
    connector: &dyn RepositoryConnector,
    rebaser: &dyn RebaseExecutor,
    store: &mut PullRequestLastUpdateStore,
    repo: &RepositoryConfig,
) -> Result<Vec<Outcome>> {
    debug!(repo = %repo.name, host = %connector.host_type(), "processing repository");

    let pull_requests = connector.list_pull_requests(repo).await?;
    let mut outcomes = Vec::with_capacity(pull_requests.len());
    for pr in &pull_requests {
        outcomes.push(handle_pull_request(connector, rebaser, store, repo, pr).await?);
    }

    debug!(repo = %repo.name, count = outcomes.len(), "processing done");
    Ok(outcomes)
}
