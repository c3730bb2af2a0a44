//! Fetch artist portraits from their recorded source URLs.
//!
//! Each artist photo may carry a `sourceUrl` next to its public `path`. This
//! module plans which of those need downloading into the static tree
//! (`<static_dir><path>`) and then fetches them one at a time.
//!
//! A failed fetch is recorded against its artist and the batch keeps going;
//! the caller decides the exit status from [`DownloadReport::has_failures`].
//!
//! Network access goes through the [`Fetcher`] trait so the planning and
//! reporting logic is testable without HTTP.

use crate::assets::ASSETS_PREFIX;
use crate::content::{self, ContentError};
use crate::types::Artist;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("unknown artist slug {0:?} passed to --only")]
    UnknownSlug(String),
    #[error("failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Source of image bytes for a URL.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking HTTP fetcher.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("opera-roster/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }
}

#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// Re-download files that already exist.
    pub force: bool,
    /// Report what would be fetched without touching network or disk.
    pub dry_run: bool,
    /// Restrict to these slugs. Empty means every artist.
    pub only: Vec<String>,
}

/// Why an artist was not downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoPhoto,
    NoSourceUrl,
    /// `photo.path` is missing, outside `/assets/`, or contains `..`.
    BadPath(String),
    AlreadyExists,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoPhoto => write!(f, "no photo"),
            SkipReason::NoSourceUrl => write!(f, "no sourceUrl"),
            SkipReason::BadPath(path) if path.is_empty() => write!(f, "no photo path"),
            SkipReason::BadPath(path) => write!(f, "path {path:?} is not under {ASSETS_PREFIX}"),
            SkipReason::AlreadyExists => write!(f, "already exists"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    Fetch { url: String, target: PathBuf },
    Skip(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedItem {
    pub slug: String,
    pub name: String,
    pub action: PlannedAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Fetched { bytes: usize },
    WouldFetch,
    Skipped(SkipReason),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub slug: String,
    pub name: String,
    pub url: Option<String>,
    pub target: Option<PathBuf>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    pub items: Vec<ItemReport>,
    pub dry_run: bool,
}

impl DownloadReport {
    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.outcome)).count()
    }

    pub fn fetched(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Fetched { .. }))
    }

    pub fn would_fetch(&self) -> usize {
        self.count(|o| matches!(o, Outcome::WouldFetch))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}

/// Decide what to do for each selected artist.
///
/// Unknown `--only` slugs are rejected before anything else happens.
pub fn plan(
    artists: &[Artist],
    static_dir: &Path,
    options: &DownloadOptions,
) -> Result<Vec<PlannedItem>, DownloadError> {
    let known: HashSet<&str> = artists.iter().map(|a| a.slug.as_str()).collect();
    if let Some(unknown) = options.only.iter().find(|s| !known.contains(s.as_str())) {
        return Err(DownloadError::UnknownSlug(unknown.clone()));
    }

    let selected = artists
        .iter()
        .filter(|a| options.only.is_empty() || options.only.iter().any(|s| *s == a.slug));

    Ok(selected
        .map(|artist| PlannedItem {
            slug: artist.slug.clone(),
            name: artist.name.clone(),
            action: plan_one(artist, static_dir, options.force),
        })
        .collect())
}

fn plan_one(artist: &Artist, static_dir: &Path, force: bool) -> PlannedAction {
    let Some(photo) = &artist.photo else {
        return PlannedAction::Skip(SkipReason::NoPhoto);
    };
    let Some(url) = photo.source_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) else {
        return PlannedAction::Skip(SkipReason::NoSourceUrl);
    };
    let path = photo.path.as_deref().unwrap_or_default().trim();
    let Some(target) = target_path(static_dir, path) else {
        return PlannedAction::Skip(SkipReason::BadPath(path.to_string()));
    };
    if target.exists() && !force {
        return PlannedAction::Skip(SkipReason::AlreadyExists);
    }
    PlannedAction::Fetch {
        url: url.to_string(),
        target,
    }
}

/// `<static_dir><public_path>` for a safe `/assets/...` path.
pub fn target_path(static_dir: &Path, public_path: &str) -> Option<PathBuf> {
    if !public_path.starts_with(ASSETS_PREFIX) {
        return None;
    }
    let relative = public_path.trim_start_matches('/');
    if relative
        .split('/')
        .any(|seg| seg.is_empty() || seg == "." || seg == "..")
    {
        return None;
    }
    Some(static_dir.join(relative))
}

/// Load the roster and download every planned photo.
pub fn download_assets(
    content_dir: &Path,
    static_dir: &Path,
    options: &DownloadOptions,
    fetcher: &dyn Fetcher,
) -> Result<DownloadReport, DownloadError> {
    let artists = content::load_artists(content_dir)?;
    let planned = plan(&artists, static_dir, options)?;

    let items = planned
        .into_iter()
        .map(|item| execute(item, options.dry_run, fetcher))
        .collect();

    Ok(DownloadReport {
        items,
        dry_run: options.dry_run,
    })
}

fn execute(item: PlannedItem, dry_run: bool, fetcher: &dyn Fetcher) -> ItemReport {
    let (url, target, outcome) = match item.action {
        PlannedAction::Skip(reason) => {
            tracing::debug!(slug = %item.slug, "skipped: {reason}");
            (None, None, Outcome::Skipped(reason))
        }
        PlannedAction::Fetch { url, target } if dry_run => (Some(url), Some(target), Outcome::WouldFetch),
        PlannedAction::Fetch { url, target } => {
            let outcome = match fetch_to(fetcher, &url, &target) {
                Ok(bytes) => {
                    tracing::info!(slug = %item.slug, bytes, "downloaded {url}");
                    Outcome::Fetched { bytes }
                }
                Err(e) => {
                    tracing::warn!(slug = %item.slug, "download of {url} failed: {e}");
                    Outcome::Failed(e.to_string())
                }
            };
            (Some(url), Some(target), outcome)
        }
    };
    ItemReport {
        slug: item.slug,
        name: item.name,
        url,
        target,
        outcome,
    }
}

/// Fetch into a `.part` file and rename, so an interrupted download never
/// leaves a truncated file that later runs would skip as existing.
fn fetch_to(fetcher: &dyn Fetcher, url: &str, target: &Path) -> Result<usize, FetchError> {
    let bytes = fetcher.fetch(url)?;
    let io_err = |source| FetchError::Io {
        path: target.to_path_buf(),
        source,
    };
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut partial = target.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);
    fs::write(&partial, &bytes).map_err(io_err)?;
    fs::rename(&partial, target).map_err(io_err)?;
    Ok(bytes.len())
}
