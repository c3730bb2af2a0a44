//! Base-path-aware link construction.
//!
//! Every internal absolute path in the rendered site goes through
//! [`SiteLinks::apply_base`], so the whole site can be deployed under a URL
//! subdirectory by changing one setting. Canonical URLs join the base URL
//! with the base-path-adjusted page path.

use crate::config::SiteUrlConfig;
use crate::types::Site;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteLinks {
    /// Normalized prefix: empty for the domain root, otherwise `/segment`
    /// with no trailing slash.
    base_path: String,
    /// Origin without a trailing slash, e.g. `https://example.com`.
    base_url: Option<String>,
}

impl SiteLinks {
    pub fn new(base_path: Option<&str>, base_url: Option<&str>) -> Self {
        Self {
            base_path: normalize_base_path(base_path.unwrap_or("")),
            base_url: base_url
                .map(|u| u.trim().trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
        }
    }

    /// Resolve from `site.json`, letting config/env values win.
    pub fn resolve(site: &Site, overrides: &SiteUrlConfig) -> Self {
        let base_path = overrides
            .base_path
            .as_deref()
            .or(site.base_path.as_deref());
        let base_url = overrides.base_url.as_deref().or(site.base_url.as_deref());
        Self::new(base_path, base_url)
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Prefix an internal absolute path with the base path.
    ///
    /// Anything not starting with `/` (external URLs, `mailto:`, anchors) is
    /// returned unchanged.
    pub fn apply_base(&self, path: &str) -> String {
        if path.starts_with('/') && !path.starts_with("//") {
            format!("{}{}", self.base_path, path)
        } else {
            path.to_string()
        }
    }

    /// Absolute URL for a page path, or `None` without a configured base URL.
    pub fn canonical_url(&self, path: &str) -> Option<String> {
        self.base_url
            .as_ref()
            .map(|origin| format!("{}{}", origin, self.apply_base(path)))
    }
}

/// Normalize a base path to `""` or `/a/b` form.
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
