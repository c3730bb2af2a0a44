//! Import a local image as an artist portrait.
//!
//! The source is cover-cropped to the requested box and written to
//! `<static_dir>/assets/images/artists/<slug>.<ext>`. When `artists.json`
//! lists the slug, its `photo.path` is pointed at the new file. The JSON is
//! edited as a generic value so unrelated keys and their order survive.

use crate::content::ARTISTS_FILE;
use crate::imaging::{
    BackendError, Dimensions, ImageBackend, OutputFormat, PortraitConfig, Quality,
    create_portrait, parse_aspect, supported_input_extensions,
};
use crate::validate::is_valid_slug;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Public directory for imported portraits.
pub const PORTRAIT_DIR: &str = "/assets/images/artists";

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("invalid slug {0:?} (expected lowercase kebab-case)")]
    InvalidSlug(String),
    #[error("{0}")]
    InvalidAspect(String),
    #[error("width and height must be at least 1 pixel")]
    InvalidSize,
    #[error("source image not found: {0}")]
    MissingSource(PathBuf),
    #[error("{0} already exists (use --force to overwrite)")]
    OutputExists(PathBuf),
    #[error("image processing failed: {0}")]
    Backend(#[from] BackendError),
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{0} is neither an artist array nor an object with an \"artists\" array")]
    UnexpectedShape(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub source: PathBuf,
    pub slug: String,
    pub width: u32,
    /// Overrides `aspect` when set.
    pub height: Option<u32>,
    /// `W:H`, `W/H` or a decimal.
    pub aspect: String,
    pub format: OutputFormat,
    pub quality: Quality,
    pub force: bool,
}

impl ImportOptions {
    pub fn new(source: impl Into<PathBuf>, slug: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            slug: slug.into(),
            width: 800,
            height: None,
            aspect: "4:5".to_string(),
            format: OutputFormat::default(),
            quality: Quality::default(),
            force: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportResult {
    pub output: PathBuf,
    pub public_path: String,
    pub width: u32,
    pub height: u32,
    pub source: Dimensions,
    /// Whether `artists.json` was rewritten.
    pub artist_updated: bool,
}

/// Crop `options.source` into the static tree and record it on the artist.
pub fn import_photo(
    backend: &impl ImageBackend,
    static_dir: &Path,
    content_dir: &Path,
    options: &ImportOptions,
) -> Result<ImportResult, ImportError> {
    if !is_valid_slug(&options.slug) {
        return Err(ImportError::InvalidSlug(options.slug.clone()));
    }
    if options.width == 0 || options.height == Some(0) {
        return Err(ImportError::InvalidSize);
    }
    let aspect = parse_aspect(&options.aspect).map_err(ImportError::InvalidAspect)?;
    if !options.source.is_file() {
        return Err(ImportError::MissingSource(options.source.clone()));
    }
    let known_extension = options
        .source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| supported_input_extensions().contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    if !known_extension {
        tracing::warn!(
            "{} has an unfamiliar extension, decoding by content",
            options.source.display()
        );
    }
    if !options.format.is_lossy() && options.quality != Quality::default() {
        tracing::debug!("quality is ignored for {} output", options.format);
    }

    let public_path = format!(
        "{PORTRAIT_DIR}/{}.{}",
        options.slug,
        options.format.extension()
    );
    let output = static_dir.join(public_path.trim_start_matches('/'));
    if output.exists() && !options.force {
        return Err(ImportError::OutputExists(output));
    }
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|source| ImportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let source_dims = backend.identify(&options.source)?;
    let config = PortraitConfig {
        width: options.width,
        height: options.height,
        aspect,
        format: options.format,
        quality: options.quality,
    };
    let (width, height) = create_portrait(backend, &options.source, &output, &config)?;
    tracing::info!(
        slug = %options.slug,
        "cropped {}x{} source to {}x{}",
        source_dims.width,
        source_dims.height,
        width,
        height
    );

    let artists_path = content_dir.join(ARTISTS_FILE);
    let artist_updated = if artists_path.exists() {
        update_artist_photo(&artists_path, &options.slug, &public_path)?
    } else {
        false
    };
    if !artist_updated {
        tracing::warn!(slug = %options.slug, "no artist entry updated in {}", artists_path.display());
    }

    Ok(ImportResult {
        output,
        public_path,
        width,
        height,
        source: source_dims,
        artist_updated,
    })
}

/// Set `photo.path` on the artist with `slug`, preserving everything else.
///
/// Accepts the bare array and the `{"artists": [...]}` form. Returns
/// `Ok(false)` without writing when no artist matches.
pub fn update_artist_photo(
    artists_path: &Path,
    slug: &str,
    public_path: &str,
) -> Result<bool, ImportError> {
    let text = fs::read_to_string(artists_path).map_err(|source| ImportError::Io {
        path: artists_path.to_path_buf(),
        source,
    })?;
    let mut doc: Value = serde_json::from_str(&text).map_err(|source| ImportError::Json {
        path: artists_path.to_path_buf(),
        source,
    })?;

    let artists = match &mut doc {
        Value::Array(list) => list,
        Value::Object(map) => match map.get_mut("artists") {
            Some(Value::Array(list)) => list,
            _ => return Err(ImportError::UnexpectedShape(artists_path.to_path_buf())),
        },
        _ => return Err(ImportError::UnexpectedShape(artists_path.to_path_buf())),
    };

    let Some(entry) = artists
        .iter_mut()
        .filter_map(Value::as_object_mut)
        .find(|a| a.get("slug").and_then(Value::as_str) == Some(slug))
    else {
        return Ok(false);
    };

    let path = Value::String(public_path.to_string());
    match entry.get_mut("photo") {
        Some(Value::Object(photo)) => {
            photo.insert("path".to_string(), path);
        }
        _ => {
            let mut photo = serde_json::Map::new();
            photo.insert("path".to_string(), path);
            entry.insert("photo".to_string(), Value::Object(photo));
        }
    }

    let mut out = serde_json::to_string_pretty(&doc).map_err(|source| ImportError::Json {
        path: artists_path.to_path_buf(),
        source,
    })?;
    out.push('\n');
    fs::write(artists_path, out).map_err(|source| ImportError::Io {
        path: artists_path.to_path_buf(),
        source,
    })?;
    Ok(true)
}
