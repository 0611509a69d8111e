//! rebazer - keeps pull requests rebased and merges them once they are ready
//!
//! On a fixed schedule rebazer visits every configured repository on GitHub
//! or GitLab and, for each open pull request:
//! - waits for a green build,
//! - rebases the source branch onto the destination when it fell behind,
//! - waits for approval,
//! - merges.
//!
//! A small in-memory store remembers which PR versions were already looked
//! at so an unchanged PR costs one listing call per sweep.

pub mod config;
pub mod connector;
pub mod error;
pub mod rebase;
pub mod reconcile;
pub mod tracking;
pub mod types;

pub use error::{Error, Result};
