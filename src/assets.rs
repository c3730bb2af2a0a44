//! Static asset copying and the materialized-asset index.
//!
//! The builder copies the static tree into the output root first, then
//! records every file that landed under `assets/` in an [`AssetIndex`]. The
//! renderer consults the index (never the filesystem) to decide whether a
//! photo path is usable, so page rendering has no hidden dependency on copy
//! order.

use crate::types::Photo;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Public path of the portrait used when an artist or team member has no
/// usable photo.
pub const PLACEHOLDER_PATH: &str = "/assets/images/placeholder-artist.svg";

const PLACEHOLDER_SVG: &str = include_str!("../theme/placeholder-artist.svg");

/// Public URL prefix every photo path must start with.
pub const ASSETS_PREFIX: &str = "/assets/";

/// Copy `src` into `dst` verbatim, returning the number of files copied.
///
/// A missing source tree is not an error: a fresh project may have no
/// static files yet.
pub fn copy_static_tree(src: &Path, dst: &Path) -> io::Result<usize> {
    if !src.is_dir() {
        tracing::debug!("no static directory at {}, skipping copy", src.display());
        return Ok(0);
    }
    let mut copied = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        if relative.as_os_str().is_empty() {
            continue;
        }
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Write the built-in placeholder portrait unless the static tree already
/// provided one. Returns whether a file was written.
pub fn ensure_placeholder(output_dir: &Path) -> io::Result<bool> {
    let target = output_dir.join(PLACEHOLDER_PATH.trim_start_matches('/'));
    if target.exists() {
        return Ok(false);
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, PLACEHOLDER_SVG)?;
    Ok(true)
}

/// Set of public asset paths (`/assets/...`) present in the output tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetIndex {
    paths: BTreeSet<String>,
}

impl AssetIndex {
    /// Index every file under `<output_dir>/assets`.
    pub fn scan(output_dir: &Path) -> io::Result<Self> {
        let root = output_dir.join("assets");
        let mut paths = BTreeSet::new();
        if root.is_dir() {
            for entry in WalkDir::new(&root) {
                let entry = entry.map_err(io::Error::other)?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry
                    .path()
                    .strip_prefix(&root)
                    .map_err(io::Error::other)?;
                let public = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                paths.insert(format!("{ASSETS_PREFIX}{public}"));
            }
        }
        Ok(Self { paths })
    }

    pub fn contains(&self, public_path: &str) -> bool {
        self.paths.contains(public_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// The photo's path if it is under `/assets/` and was materialized.
    pub fn photo_path<'a>(&self, photo: Option<&'a Photo>) -> Option<&'a str> {
        photo
            .and_then(|p| p.path.as_deref())
            .map(str::trim)
            .filter(|path| path.starts_with(ASSETS_PREFIX) && self.contains(path))
    }

    /// Like [`photo_path`](Self::photo_path) but falls back to the placeholder.
    pub fn photo_or_placeholder<'a>(&self, photo: Option<&'a Photo>) -> &'a str {
        self.photo_path(photo).unwrap_or(PLACEHOLDER_PATH)
    }
}

impl<S: Into<String>> FromIterator<S> for AssetIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}
