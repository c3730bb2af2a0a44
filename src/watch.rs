//! Polling change detection for the dev server.
//!
//! A [`Snapshot`] records the modification time of every file under a set of
//! roots. Comparing two snapshots yields a [`ChangeSet`]. Polling keeps the
//! server free of platform file-notification APIs and behaves the same on
//! network mounts and in containers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// File path → modification time for every file under the watched roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot(BTreeMap<PathBuf, SystemTime>);

/// Differences between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }
}

impl Snapshot {
    /// Walk every root and record file mtimes.
    ///
    /// Missing roots are skipped. Files that vanish mid-walk or whose metadata
    /// cannot be read are left out rather than failing the poll.
    pub fn take(roots: &[&Path]) -> Self {
        let mut files = BTreeMap::new();
        for root in roots {
            if !root.exists() {
                continue;
            }
            for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Some(mtime) = entry.metadata().ok().and_then(|m| m.modified().ok()) {
                    files.insert(entry.into_path(), mtime);
                }
            }
        }
        Self(files)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// What changed going from `self` to `newer`.
    pub fn diff(&self, newer: &Snapshot) -> ChangeSet {
        let mut changes = ChangeSet::default();
        for (path, mtime) in &newer.0 {
            match self.0.get(path) {
                None => changes.added.push(path.clone()),
                Some(old) if old != mtime => changes.modified.push(path.clone()),
                Some(_) => {}
            }
        }
        for path in self.0.keys() {
            if !newer.0.contains_key(path) {
                changes.removed.push(path.clone());
            }
        }
        changes
    }
}
