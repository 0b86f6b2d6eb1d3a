//! Content-hash snapshots and update plans for incremental re-indexing.
//!
//! A [`Snapshot`] records `path -> content hash` for every file that survived
//! the directory walk of a given `(repository, version)`. Diffing a prior
//! snapshot against the hashes of the current tree yields an [`UpdatePlan`]
//! that partitions paths into added/modified/deleted/unchanged, so the parsing
//! pipeline only has to revisit `added ∪ modified`.
//!
//! Storage is one JSON file per `(repository, version)` under the store root,
//! with a format version field for forward compatibility.

pub mod errors;

pub use errors::{Result, SnapshotError};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Highest on-disk format this build can read. Bump on breaking layout changes.
pub const FORMAT_VERSION: u32 = 1;

/// Recorded state of a repository tree at one version: repo-relative paths
/// (forward slashes) mapped to content hashes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub format_version: u32,
    pub repository_id: String,
    pub version_id: String,
    /// `BTreeMap` keeps the serialized form stable across runs.
    pub files: BTreeMap<String, String>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl Snapshot {
    pub fn new(repository_id: &str, version_id: &str, files: BTreeMap<String, String>) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            repository_id: repository_id.to_string(),
            version_id: version_id.to_string(),
            files,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Set-level diff between a prior snapshot and the current tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePlan {
    pub added: BTreeSet<String>,
    pub modified: BTreeSet<String>,
    pub deleted: BTreeSet<String>,
    pub unchanged: BTreeSet<String>,
}

impl UpdatePlan {
    /// Paths that must be re-parsed: `added ∪ modified`.
    pub fn dirty(&self) -> BTreeSet<String> {
        self.added.union(&self.modified).cloned().collect()
    }

    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.modified.is_empty() || !self.deleted.is_empty()
    }
}

/// Diff a prior snapshot against the hashes of the current tree.
///
/// Straight set arithmetic over path keys, then hash comparison on the
/// intersection. The result does not depend on map iteration order.
pub fn diff(prior: &Snapshot, current: &BTreeMap<String, String>) -> UpdatePlan {
    let mut plan = UpdatePlan::default();

    for (path, hash) in current {
        match prior.files.get(path) {
            Some(old_hash) if old_hash == hash => {
                plan.unchanged.insert(path.clone());
            }
            Some(_) => {
                plan.modified.insert(path.clone());
            }
            None => {
                plan.added.insert(path.clone());
            }
        }
    }

    for path in prior.files.keys() {
        if !current.contains_key(path) {
            plan.deleted.insert(path.clone());
        }
    }

    plan
}

/// Filesystem-backed snapshot store: one JSON file per `(repo, version)`.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    /// Open a store rooted at `root`, creating the directory if missing.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Load a snapshot, or `None` if it was never saved.
    pub fn load(&self, repository_id: &str, version_id: &str) -> Result<Option<Snapshot>> {
        let path = self.snapshot_path(repository_id, version_id)?;
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        if snapshot.format_version > FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedFormat {
                found: snapshot.format_version,
                supported: FORMAT_VERSION,
            });
        }
        debug!(
            repository = repository_id,
            version = version_id,
            files = snapshot.files.len(),
            "snapshot loaded"
        );
        Ok(Some(snapshot))
    }

    /// Persist a snapshot, replacing any previous file for the same version.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let path = self.snapshot_path(&snapshot.repository_id, &snapshot.version_id)?;
        let raw = serde_json::to_string_pretty(snapshot)?;
        fs::write(&path, raw)?;
        info!(
            repository = %snapshot.repository_id,
            version = %snapshot.version_id,
            files = snapshot.files.len(),
            "snapshot saved"
        );
        Ok(())
    }

    fn snapshot_path(&self, repository_id: &str, version_id: &str) -> Result<PathBuf> {
        let repo = sanitize_id(repository_id)?;
        let version = sanitize_id(version_id)?;
        Ok(self.root.join(format!("{repo}__{version}.json")))
    }
}

/// Restrict identifiers to a filename-safe alphabet.
fn sanitize_id(id: &str) -> Result<String> {
    if id.is_empty() {
        return Err(SnapshotError::InvalidIdentifier(id.to_string()));
    }
    let ok = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !ok {
        return Err(SnapshotError::InvalidIdentifier(id.to_string()));
    }
    Ok(id.to_string())
}
