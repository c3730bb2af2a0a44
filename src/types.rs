//! Content types read from the JSON content store.
//!
//! These mirror the on-disk JSON shape (camelCase keys) and are read-only for
//! the rest of the pipeline: the validator checks them, the renderer turns
//! them into pages.

use serde::{Deserialize, Serialize};

/// Site-wide configuration from `site.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Site {
    pub agency_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    pub description: String,
    /// Absolute origin used for canonical URLs and the sitemap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// URL prefix when the site is deployed under a subdirectory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    pub contact: Contact,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub team: Vec<TeamMember>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<ExternalLink>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Contact {
    /// True when no channel has visible text.
    pub fn is_empty(&self) -> bool {
        [&self.email, &self.phone, &self.location]
            .into_iter()
            .all(|field| non_blank(field.as_deref()).is_none())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalLink {
    pub label: String,
    pub url: String,
}

/// One artist on the roster.
///
/// Only `slug` and `name` are required, and even those are checked by
/// [`validate`](crate::validate) rather than by serde so the error can name
/// the offending record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Artist {
    pub slug: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discipline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub repertoire_highlights: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operabase_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<Photo>,
}

impl Artist {
    /// Display label: discipline, falling back to voice type.
    pub fn label(&self) -> Option<&str> {
        non_blank(self.discipline.as_deref()).or_else(|| non_blank(self.voice_type.as_deref()))
    }

    /// Page path relative to the site root, before the base path is applied.
    pub fn page_path(&self) -> String {
        format!("/artists/{}/", self.slug)
    }
}

/// Portrait reference shared by artists and team members.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Photo {
    /// Public path, expected under `/assets/`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit: Option<String>,
    /// Where the image was originally obtained; used by `download-assets`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamMember {
    pub name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<Photo>,
}

/// `Some(s)` when `s` has non-whitespace content.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
