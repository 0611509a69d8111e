//! Fixed-delay polling over every configured repository

use crate::config::{RebazerConfig, RepositoryConfig, RepositoryHost, RepositoryTeam};
use crate::connector::create_connector;
use crate::error::Result;
use crate::rebase::{CommitIdentity, GitRebaseExecutor};
use crate::reconcile::engine::handle_repository;
use crate::tracking::{PullRequestLastUpdateStore, load_store, save_store};
use crate::types::Outcome;
use tracing::{debug, error, info, warn};

/// Tally of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Repositories processed without error
    pub repositories: usize,
    /// Repositories whose processing stopped on an error
    pub failed_repositories: usize,
    /// Outcome of every evaluated pull request, in evaluation order
    pub outcomes: Vec<Outcome>,
}

impl SweepSummary {
    /// Number of pull requests merged during the sweep
    pub fn merged(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| **o == Outcome::Merged)
            .count()
    }
}

/// Drives sweeps and owns the handled-version store
///
/// Sweeps never overlap: the next one starts `poll_interval` after the
/// previous one completed.
pub struct Poller {
    config: RebazerConfig,
    store: PullRequestLastUpdateStore,
}

impl Poller {
    /// Create a poller, restoring the store from `state_file` when configured
    ///
    /// An unreadable state file is logged and replaced by an empty store.
    pub fn new(config: RebazerConfig) -> Self {
        let store = match config.state_file.as_deref() {
            Some(path) => match load_store(path) {
                Ok(store) => {
                    debug!(path = %path.display(), entries = store.len(), "restored handled versions");
                    store
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring unreadable state file");
                    PullRequestLastUpdateStore::new()
                }
            },
            None => PullRequestLastUpdateStore::new(),
        };
        Self::with_store(config, store)
    }

    /// Create a poller with an explicit store
    pub const fn with_store(config: RebazerConfig, store: PullRequestLastUpdateStore) -> Self {
        Self { config, store }
    }

    /// Configuration being polled
    pub const fn config(&self) -> &RebazerConfig {
        &self.config
    }

    /// Handled PR versions recorded so far
    pub const fn store(&self) -> &PullRequestLastUpdateStore {
        &self.store
    }

    /// Run one sweep over hosts → teams → repositories in configuration order
    ///
    /// An error aborts only the repository it occurred in.
    pub async fn sweep(&mut self) -> SweepSummary {
        let mut summary = SweepSummary::default();

        for (host, team, repo) in self.config.repositories() {
            match sweep_repository(&self.config, &mut self.store, host, team, repo).await {
                Ok(outcomes) => {
                    summary.repositories += 1;
                    summary.outcomes.extend(outcomes);
                }
                Err(e) => {
                    error!(
                        host = %host.host_type,
                        team = %team.name,
                        repo = %repo.name,
                        error = %e,
                        "repository processing failed"
                    );
                    summary.failed_repositories += 1;
                }
            }
        }

        self.persist();
        summary
    }

    /// Sweep forever with `poll_interval` between sweeps, until Ctrl-C
    pub async fn run(&mut self) {
        let interval = self.config.poll_interval();
        info!(
            interval_secs = interval.as_secs(),
            repositories = self.config.repositories().count(),
            "polling started"
        );

        loop {
            let summary = self.sweep().await;
            debug!(
                repositories = summary.repositories,
                failed = summary.failed_repositories,
                pull_requests = summary.outcomes.len(),
                merged = summary.merged(),
                "sweep done"
            );

            tokio::select! {
                () = tokio::time::sleep(interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupted, stopping");
                    break;
                }
            }
        }
    }

    fn persist(&self) {
        if let Some(path) = self.config.state_file.as_deref()
            && let Err(e) = save_store(path, &self.store)
        {
            warn!(path = %path.display(), error = %e, "failed to save handled versions");
        }
    }
}

async fn sweep_repository(
    config: &RebazerConfig,
    store: &mut PullRequestLastUpdateStore,
    host: &RepositoryHost,
    team: &RepositoryTeam,
    repo: &RepositoryConfig,
) -> Result<Vec<Outcome>> {
    let connector = create_connector(host, team, &config.bot_name)?;
    let rebaser = GitRebaseExecutor::for_team(
        &config.workspace,
        host,
        team,
        CommitIdentity::for_bot(&config.bot_name),
    )?;
    handle_repository(connector.as_ref(), &rebaser, store, repo).await
}
