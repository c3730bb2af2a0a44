//! Shared test utilities for the opera-roster test suite.
//!
//! Provides a content-tree builder that writes `site.json`, `artists.json`,
//! `team.json` and static files into a temp directory, plus small
//! constructors for in-memory content types.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let fixture = ContentFixture::new()
//!     .artists_json(r#"[{"slug": "ana-lee", "name": "Ana Lee"}]"#)
//!     .static_file("assets/images/artists/ana-lee.jpg", b"jpeg")
//!     .write();
//!
//! let summary = build_site(&fixture.config()).unwrap();
//! let home = fixture.read_output("index.html");
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::config::RosterConfig;
use crate::types::{Artist, Site};

pub const DEFAULT_SITE_JSON: &str =
    r#"{"agencyName": "Test Agency", "description": "An agency for singers."}"#;
pub const DEFAULT_ARTISTS_JSON: &str = r#"[{"slug": "ana-lee", "name": "Ana Lee"}]"#;

// =========================================================================
// Content tree fixture
// =========================================================================

/// Builder for an on-disk project: `content/`, `static/` and `dist/` under
/// one temp root.
pub struct ContentFixture {
    site_json: String,
    artists_json: String,
    team_json: Option<String>,
    static_files: Vec<(String, Vec<u8>)>,
}

impl ContentFixture {
    pub fn new() -> Self {
        Self {
            site_json: DEFAULT_SITE_JSON.to_string(),
            artists_json: DEFAULT_ARTISTS_JSON.to_string(),
            team_json: None,
            static_files: Vec::new(),
        }
    }

    pub fn site_json(mut self, json: &str) -> Self {
        self.site_json = json.to_string();
        self
    }

    pub fn artists_json(mut self, json: &str) -> Self {
        self.artists_json = json.to_string();
        self
    }

    pub fn team_json(mut self, json: &str) -> Self {
        self.team_json = Some(json.to_string());
        self
    }

    /// Add a file under `static/`, e.g. `assets/images/a.jpg`.
    pub fn static_file(mut self, relative: &str, bytes: &[u8]) -> Self {
        self.static_files.push((relative.to_string(), bytes.to_vec()));
        self
    }

    pub fn write(self) -> WrittenFixture {
        let tmp = TempDir::new().unwrap();
        let content = tmp.path().join("content");
        fs::create_dir_all(&content).unwrap();
        fs::write(content.join("site.json"), &self.site_json).unwrap();
        fs::write(content.join("artists.json"), &self.artists_json).unwrap();
        if let Some(team) = &self.team_json {
            fs::write(content.join("team.json"), team).unwrap();
        }
        for (relative, bytes) in &self.static_files {
            let path = tmp.path().join("static").join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, bytes).unwrap();
        }
        WrittenFixture { tmp }
    }
}

impl Default for ContentFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A project tree on disk. Removed when dropped.
pub struct WrittenFixture {
    tmp: TempDir,
}

impl WrittenFixture {
    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn content_dir(&self) -> PathBuf {
        self.tmp.path().join("content")
    }

    pub fn static_dir(&self) -> PathBuf {
        self.tmp.path().join("static")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.tmp.path().join("dist")
    }

    /// Stock config with all paths pointing into the fixture.
    pub fn config(&self) -> RosterConfig {
        let mut config = RosterConfig::default();
        config.paths.content = self.content_dir();
        config.paths.static_dir = self.static_dir();
        config.paths.output = self.output_dir();
        config
    }

    /// Read a generated file. Panics with the path on a miss.
    pub fn read_output(&self, relative: &str) -> String {
        let path = self.output_dir().join(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
    }

    /// Every output file keyed by relative path.
    pub fn snapshot_output(&self) -> BTreeMap<String, Vec<u8>> {
        let root = self.output_dir();
        WalkDir::new(&root)
            .into_iter()
            .map(Result::unwrap)
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let rel = e.path().strip_prefix(&root).unwrap();
                (rel.to_string_lossy().into_owned(), fs::read(e.path()).unwrap())
            })
            .collect()
    }
}

// =========================================================================
// In-memory constructors
// =========================================================================

/// Artist with only the required fields set.
pub fn artist(slug: &str, name: &str) -> Artist {
    Artist {
        slug: slug.to_string(),
        name: name.to_string(),
        ..Artist::default()
    }
}

/// Site matching [`DEFAULT_SITE_JSON`].
pub fn sample_site() -> Site {
    serde_json::from_str(DEFAULT_SITE_JSON).unwrap()
}
