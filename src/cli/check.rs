//! check-config command

use anyhow::Result;
use std::path::Path;

/// Print the repositories the configuration covers
pub fn run_check_config(config: Option<&Path>) -> Result<()> {
    let config = super::load(config)?;

    println!(
        "poll interval {}s, workspace {}",
        config.poll_interval,
        config.workspace.display()
    );
    for (host, team, repo) in config.repositories() {
        println!("{} {} {}/{}", host.host_type, host.api_url(), team.name, repo.name);
    }
    Ok(())
}
