//! Last-common-commit lookup shared by the connectors.

use crate::error::{Error, Result};

/// Find the most recent commit a PR shares with its destination.
///
/// `known_shas` is every SHA the host reported in the PR's commit listing,
/// parent references included; `parent_shas` are the declared parents in
/// listing order (oldest commit first). The first parent that is also a known
/// SHA wins. For a listing that reports its parents this is the parent of the
/// oldest PR commit, i.e. the point the branch was forked from.
///
/// Returns [`Error::NotFound`] if no parent is known, which a well-formed PR
/// never produces.
pub fn last_common_commit(known_shas: &[String], parent_shas: &[String]) -> Result<String> {
    parent_shas
        .iter()
        .find(|parent| known_shas.contains(parent))
        .cloned()
        .ok_or_else(|| Error::NotFound("no commit shared with the destination branch".to_string()))
}
