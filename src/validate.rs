//! Structural checks on the artist roster.
//!
//! Runs before the output directory is touched, so a failing roster leaves
//! the previous build in place. The first violation wins.

use crate::types::Artist;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("artist #{index} ({label}) is missing required field `{field}`")]
    MissingField {
        index: usize,
        label: String,
        field: &'static str,
    },
    #[error("artist #{index} has invalid slug {slug:?} (expected lowercase words joined by single hyphens)")]
    InvalidSlug { index: usize, slug: String },
    #[error("artist #{index} reuses slug {slug:?} (first used by artist #{first})")]
    DuplicateSlug {
        index: usize,
        first: usize,
        slug: String,
    },
}

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_re() -> &'static Regex {
    SLUG_RE.get_or_init(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap())
}

pub fn is_valid_slug(slug: &str) -> bool {
    slug_re().is_match(slug)
}

/// Check required fields, slug format and slug uniqueness.
///
/// Indices in errors are 1-based to match how people count records in a file.
pub fn validate_artists(artists: &[Artist]) -> Result<(), ValidationError> {
    let mut first_seen: HashMap<&str, usize> = HashMap::with_capacity(artists.len());

    for (i, artist) in artists.iter().enumerate() {
        let index = i + 1;
        let slug = artist.slug.trim();
        let name = artist.name.trim();

        if slug.is_empty() {
            return Err(ValidationError::MissingField {
                index,
                label: describe(name, "unnamed"),
                field: "slug",
            });
        }
        if name.is_empty() {
            return Err(ValidationError::MissingField {
                index,
                label: describe(slug, "no slug"),
                field: "name",
            });
        }
        if !is_valid_slug(&artist.slug) {
            return Err(ValidationError::InvalidSlug {
                index,
                slug: artist.slug.clone(),
            });
        }
        if let Some(&first) = first_seen.get(artist.slug.as_str()) {
            return Err(ValidationError::DuplicateSlug {
                index,
                first,
                slug: artist.slug.clone(),
            });
        }
        first_seen.insert(&artist.slug, index);
    }
    Ok(())
}

fn describe(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
