//! CLI commands

mod check;
mod run;

pub use check::run_check_config;
pub use run::run_poller;

use anyhow::{Context, Result};
use rebazer::config::{RebazerConfig, load_config, resolve_config_path};
use std::path::Path;

/// Resolve and load the configuration, with the path in any error
fn load(config: Option<&Path>) -> Result<RebazerConfig> {
    let path = resolve_config_path(config).context("cannot locate configuration")?;
    load_config(&path).with_context(|| format!("cannot load {}", path.display()))
}
