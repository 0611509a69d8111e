//! Default command - poll configured repositories

use anyhow::{Result, bail};
use rebazer::reconcile::Poller;
use std::path::Path;
use tracing::info;

/// Start polling; with `once`, run a single sweep and exit
///
/// A single sweep exits non-zero when any repository failed.
pub async fn run_poller(config: Option<&Path>, once: bool) -> Result<()> {
    let config = super::load(config)?;
    let mut poller = Poller::new(config);

    if !once {
        poller.run().await;
        return Ok(());
    }

    let summary = poller.sweep().await;
    info!(
        repositories = summary.repositories,
        pull_requests = summary.outcomes.len(),
        merged = summary.merged(),
        "sweep done"
    );
    if summary.failed_repositories > 0 {
        bail!(
            "{} of {} repositories failed",
            summary.failed_repositories,
            summary.failed_repositories + summary.repositories
        );
    }
    Ok(())
}
