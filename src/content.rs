//! Content store loading.
//!
//! The content directory holds three JSON files:
//!
//! ```text
//! content/
//! ├── site.json       # agency name, description, contact, links (required)
//! ├── artists.json    # roster: array, or { "artists": [...] } (required)
//! └── team.json       # team members (optional)
//! ```
//!
//! Loading is strict about syntax and lenient about shape: unknown keys are
//! ignored so the CMS can carry its own bookkeeping fields, but malformed
//! JSON aborts the build with the file path in the message.

use crate::types::{Artist, Site, TeamMember};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SITE_FILE: &str = "site.json";
pub const ARTISTS_FILE: &str = "artists.json";
pub const TEAM_FILE: &str = "team.json";

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Everything a build needs from the content store.
#[derive(Debug, Clone)]
pub struct Content {
    pub site: Site,
    pub artists: Vec<Artist>,
    pub team: Vec<TeamMember>,
}

/// `artists.json` is accepted either as a bare array or wrapped in an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum ArtistsFile {
    List(Vec<Artist>),
    Wrapped { artists: Vec<Artist> },
}

impl From<ArtistsFile> for Vec<Artist> {
    fn from(file: ArtistsFile) -> Self {
        match file {
            ArtistsFile::List(artists) | ArtistsFile::Wrapped { artists } => artists,
        }
    }
}

/// Load all content files from `content_dir`.
///
/// `team.json` wins over an inline `site.team` when both exist.
pub fn load(content_dir: &Path) -> Result<Content, ContentError> {
    let site = load_site(content_dir)?;
    let artists = load_artists(content_dir)?;
    let team = match load_team(content_dir)? {
        Some(team) => team,
        None => site.team.clone(),
    };
    tracing::debug!(
        artists = artists.len(),
        team = team.len(),
        "loaded content from {}",
        content_dir.display()
    );
    Ok(Content {
        site,
        artists,
        team,
    })
}

pub fn load_site(content_dir: &Path) -> Result<Site, ContentError> {
    read_json(&content_dir.join(SITE_FILE))
}

pub fn load_artists(content_dir: &Path) -> Result<Vec<Artist>, ContentError> {
    let file: ArtistsFile = read_json(&content_dir.join(ARTISTS_FILE))?;
    Ok(file.into())
}

/// Returns `Ok(None)` when `team.json` does not exist.
pub fn load_team(content_dir: &Path) -> Result<Option<Vec<TeamMember>>, ContentError> {
    let path = content_dir.join(TEAM_FILE);
    if !path.exists() {
        return Ok(None);
    }
    read_json(&path).map(Some)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ContentError> {
    let text = fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ContentError::Json {
        path: path.to_path_buf(),
        source,
    })
}
