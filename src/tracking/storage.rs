//! On-disk snapshot of the handled PR versions.

use super::PullRequestLastUpdateStore;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current snapshot format version.
pub const TRACKING_VERSION: u32 = 1;

/// One handled PR version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandledEntry {
    /// Repository name
    pub repo: String,
    /// PR number
    pub id: u64,
    /// Last handled update token
    pub last_update: String,
}

/// Serialized form of [`PullRequestLastUpdateStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingSnapshot {
    /// Format version
    pub version: u32,
    /// Handled entries
    #[serde(default)]
    pub entries: Vec<HandledEntry>,
}

/// Load the store from disk.
///
/// Returns an empty store if the file doesn't exist.
pub fn load_store(path: &Path) -> Result<PullRequestLastUpdateStore> {
    if !path.exists() {
        return Ok(PullRequestLastUpdateStore::new());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Tracking(format!("failed to read {}: {e}", path.display())))?;

    let snapshot: TrackingSnapshot = toml::from_str(&content)
        .map_err(|e| Error::Tracking(format!("failed to parse {}: {e}", path.display())))?;

    if snapshot.version != TRACKING_VERSION {
        return Err(Error::Tracking(format!(
            "{} has unsupported version {}",
            path.display(),
            snapshot.version
        )));
    }

    Ok(snapshot.entries.into_iter().collect())
}

/// Save the store to disk.
///
/// Creates the parent directory if it doesn't exist.
pub fn save_store(path: &Path, store: &PullRequestLastUpdateStore) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
        && !dir.exists()
    {
        fs::create_dir_all(dir)
            .map_err(|e| Error::Tracking(format!("failed to create {}: {e}", dir.display())))?;
    }

    let snapshot = TrackingSnapshot {
        version: TRACKING_VERSION,
        entries: store.entries(),
    };

    let content = toml::to_string_pretty(&snapshot)
        .map_err(|e| Error::Tracking(format!("failed to serialize handled state: {e}")))?;

    let content_with_header = format!(
        "# rebazer handled pull requests\n# Auto-generated - manual edits may be overwritten\n\n{content}"
    );

    fs::write(path, content_with_header)
        .map_err(|e| Error::Tracking(format!("failed to write {}: {e}", path.display())))?;

    Ok(())
}
