//! Reconciliation of open pull requests
//!
//! Two parts:
//! 1. Engine - decide and act on a single PR (`handle_pull_request`)
//! 2. Poller - periodic, non-overlapping sweeps over the configuration tree

mod engine;
mod poller;

pub use engine::{handle_pull_request, handle_repository};
pub use poller::{Poller, SweepSummary};
