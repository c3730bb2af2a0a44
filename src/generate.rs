//! Site building.
//!
//! Turns the content store plus the static tree into a complete static site.
//! One call to [`build_site`] is one full build; there is no incremental mode.
//!
//! ## Build Order
//!
//! 1. Load `site.json`, `artists.json`, `team.json`
//! 2. Validate the roster (nothing on disk has changed yet)
//! 3. Check the output directory neither holds nor sits inside an input
//! 4. Copy the static tree into a fresh staging directory next to the
//!    output, write the placeholder portrait, index `assets/`
//! 5. Render and write every page
//! 6. Write `robots.txt` and, with a base URL, `sitemap.xml`
//! 7. Swap the staging directory in for the old output
//!
//! Any error before step 7 leaves the previous output untouched, so a bad
//! edit or a failed write never takes a working site down.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── 404.html
//! ├── robots.txt
//! ├── sitemap.xml                # only with a base URL
//! ├── about/index.html
//! ├── contact/index.html
//! ├── artists/
//! │   ├── index.html
//! │   └── ana-lee/index.html
//! └── assets/                    # copied from static/
//!     └── images/placeholder-artist.svg
//! ```
//!
//! Artist pages are rendered and written in parallel with rayon. Each page
//! depends only on immutable inputs, so output is byte-identical to a
//! sequential loop.

use crate::assets::{self, AssetIndex};
use crate::config::RosterConfig;
use crate::content::{self, Content, ContentError};
use crate::links::SiteLinks;
use crate::render::{self, RenderContext};
use crate::validate::{self, ValidationError};
use rayon::prelude::*;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("invalid roster: {0}")]
    Validation(#[from] ValidationError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("refusing to replace output directory {0}: it overlaps the content or static directory")]
    UnsafeOutput(PathBuf),
}

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// Human-readable identity, e.g. `Home` or the artist's name.
    pub label: String,
    /// Path relative to the output directory.
    pub path: PathBuf,
}

/// What a build produced, for CLI reporting.
#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    pub output_dir: PathBuf,
    /// Normalized base path the pages were linked with.
    pub base_path: String,
    pub pages: Vec<PageRecord>,
    pub artist_count: usize,
    pub static_files: usize,
    pub sitemap_written: bool,
}

/// Load and validate content without writing anything.
pub fn check_content(config: &RosterConfig) -> Result<Content, GenerateError> {
    let content = content::load(&config.paths.content)?;
    validate::validate_artists(&content.artists)?;
    Ok(content)
}

/// Run a full build into `config.paths.output`.
pub fn build_site(config: &RosterConfig) -> Result<BuildSummary, GenerateError> {
    let content = check_content(config)?;
    let links = SiteLinks::resolve(&content.site, &config.site);
    let output_dir = config.paths.output.as_path();

    let target = ensure_safe_output(
        output_dir,
        &[config.paths.content.as_path(), config.paths.static_dir.as_path()],
    )?;
    let staging = sibling_dir(&target, "staging")?;
    reset_output_dir(&staging)?;

    let rendered = match render_site(&staging, config, &content, &links) {
        Ok(rendered) => rendered,
        Err(e) => {
            if let Err(cleanup) = fs::remove_dir_all(&staging) {
                tracing::warn!("could not remove {}: {cleanup}", staging.display());
            }
            return Err(e);
        }
    };
    publish(&staging, &target)?;

    tracing::info!(
        pages = rendered.pages.len(),
        artists = content.artists.len(),
        "site built at {}",
        output_dir.display()
    );

    Ok(BuildSummary {
        output_dir: output_dir.to_path_buf(),
        base_path: links.base_path().to_string(),
        pages: rendered.pages,
        artist_count: content.artists.len(),
        static_files: rendered.static_files,
        sitemap_written: rendered.sitemap_written,
    })
}

struct Rendered {
    pages: Vec<PageRecord>,
    static_files: usize,
    sitemap_written: bool,
}

/// Write the whole site into an empty `output_dir`.
fn render_site(
    output_dir: &Path,
    config: &RosterConfig,
    content: &Content,
    links: &SiteLinks,
) -> Result<Rendered, GenerateError> {
    let static_files = assets::copy_static_tree(&config.paths.static_dir, output_dir)
        .map_err(io_at(&config.paths.static_dir))?;
    if assets::ensure_placeholder(output_dir).map_err(io_at(output_dir))? {
        tracing::debug!("wrote built-in placeholder portrait");
    }
    let asset_index = AssetIndex::scan(output_dir).map_err(io_at(output_dir))?;
    tracing::debug!(
        static_files,
        assets = asset_index.len(),
        "static tree copied"
    );

    let css = render::stylesheet(&config.colors);
    let ctx = RenderContext {
        site: &content.site,
        team: &content.team,
        links,
        assets: &asset_index,
        css: &css,
        featured_count: config.home.featured_count,
    };

    let mut pages = Vec::new();
    let artists = &content.artists;

    pages.push(write_page(
        output_dir,
        "Home",
        "index.html",
        &render::render_home(&ctx, artists).into_string(),
    )?);
    pages.push(write_page(
        output_dir,
        "Artists",
        "artists/index.html",
        &render::render_artist_index(&ctx, artists).into_string(),
    )?);

    let artist_pages = artists
        .par_iter()
        .map(|artist| {
            let relative = format!("artists/{}/index.html", artist.slug);
            let html = render::render_artist_page(&ctx, artist).into_string();
            write_page(output_dir, &artist.name, &relative, &html)
        })
        .collect::<Result<Vec<_>, _>>()?;
    pages.extend(artist_pages);

    pages.push(write_page(
        output_dir,
        "About",
        "about/index.html",
        &render::render_about(&ctx).into_string(),
    )?);
    pages.push(write_page(
        output_dir,
        "Contact",
        "contact/index.html",
        &render::render_contact(&ctx).into_string(),
    )?);
    pages.push(write_page(
        output_dir,
        "Not found",
        "404.html",
        &render::render_not_found(&ctx).into_string(),
    )?);
    pages.push(write_page(
        output_dir,
        "robots.txt",
        "robots.txt",
        &render::render_robots(links),
    )?);

    let sitemap_written = match render::render_sitemap(links, artists) {
        Some(xml) => {
            pages.push(write_page(output_dir, "sitemap.xml", "sitemap.xml", &xml)?);
            true
        }
        None => {
            tracing::debug!("no base URL configured, skipping sitemap.xml");
            false
        }
    };

    Ok(Rendered {
        pages,
        static_files,
        sitemap_written,
    })
}

fn write_page(
    output_dir: &Path,
    label: &str,
    relative: &str,
    body: &str,
) -> Result<PageRecord, GenerateError> {
    let path = output_dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_at(parent))?;
    }
    fs::write(&path, body).map_err(io_at(&path))?;
    tracing::trace!("wrote {}", path.display());
    Ok(PageRecord {
        label: label.to_string(),
        path: PathBuf::from(relative),
    })
}

fn reset_output_dir(output_dir: &Path) -> Result<(), GenerateError> {
    if output_dir.exists() {
        fs::remove_dir_all(output_dir).map_err(io_at(output_dir))?;
    }
    fs::create_dir_all(output_dir).map_err(io_at(output_dir))
}

/// Swap a finished staging tree into place.
///
/// The old output is moved aside first and removed last, so `target` is
/// only ever missing for the moment between the two renames.
fn publish(staging: &Path, target: &Path) -> Result<(), GenerateError> {
    let retired = sibling_dir(target, "old")?;
    if retired.exists() {
        fs::remove_dir_all(&retired).map_err(io_at(&retired))?;
    }
    if target.exists() {
        fs::rename(target, &retired).map_err(io_at(target))?;
    }
    fs::rename(staging, target).map_err(io_at(target))?;
    if retired.exists() {
        fs::remove_dir_all(&retired).map_err(io_at(&retired))?;
    }
    Ok(())
}

/// `<parent>/.<name>.<suffix>` next to an absolute, normalized `dir`.
fn sibling_dir(dir: &Path, suffix: &str) -> Result<PathBuf, GenerateError> {
    match (dir.parent(), dir.file_name()) {
        (Some(parent), Some(name)) => {
            Ok(parent.join(format!(".{}.{suffix}", name.to_string_lossy())))
        }
        _ => Err(GenerateError::UnsafeOutput(dir.to_path_buf())),
    }
}

/// The output directory is replaced on every build, and its contents are
/// published. It must neither hold an input nor sit inside one.
///
/// Returns the absolute, normalized output path.
fn ensure_safe_output(output_dir: &Path, inputs: &[&Path]) -> Result<PathBuf, GenerateError> {
    let output = normalize_path(output_dir)?;
    for input in inputs {
        let input = normalize_path(input)?;
        if input.starts_with(&output) || output.starts_with(&input) {
            return Err(GenerateError::UnsafeOutput(output_dir.to_path_buf()));
        }
    }
    Ok(output)
}

/// Absolute path with `.` and `..` resolved, following symlinks for the
/// part that exists.
fn normalize_path(path: &Path) -> Result<PathBuf, GenerateError> {
    let absolute = std::path::absolute(path).map_err(io_at(path))?;
    let mut lexical = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                lexical.pop();
            }
            other => lexical.push(other),
        }
    }

    // Canonicalize the longest existing prefix and re-attach the rest.
    let mut existing = lexical.as_path();
    let mut rest = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(lexical),
        }
    }
    let mut resolved = fs::canonicalize(existing).map_err(io_at(existing))?;
    resolved.extend(rest.iter().rev());
    Ok(resolved)
}

fn io_at(path: &Path) -> impl Fn(std::io::Error) -> GenerateError + '_ {
    move |source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    }
}
