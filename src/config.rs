//! Build configuration.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. Stock defaults (the `Default` impls below)
//! 2. An optional `roster.toml` next to the content (path set with `--config`)
//! 3. Environment variables and CLI flags (`BASE_PATH`, `SITE_URL`,
//!    `--content`, `--output`, ...), applied by [`RosterConfig::apply_overrides`]
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! content = "content"       # site.json, artists.json, team.json
//! static_dir = "static"     # copied verbatim into the output root
//! output = "dist"           # wiped and rebuilt on every build
//!
//! [site]
//! # base_path = "/roster"   # deploy under a URL subdirectory
//! # base_url = "https://agency.example"  # enables canonical URLs + sitemap
//!
//! [home]
//! featured_count = 6        # artists shown on the home page
//!
//! [serve]
//! port = 8000
//! poll_interval_ms = 500    # how often the dev server scans for changes
//! debounce_ms = 150         # quiet period before a rebuild starts
//!
//! [colors.light]
//! background = "#fbf8f3"
//! # ...
//! ```
//!
//! `site.json` may also carry `basePath`/`baseUrl`; values in `roster.toml`
//! or the environment take precedence over it.
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "roster.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RosterConfig {
    pub paths: PathsConfig,
    pub site: SiteUrlConfig,
    pub home: HomeConfig,
    pub serve: ServeConfig,
    pub colors: ColorConfig,
}

impl RosterConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.site.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Validation(format!(
                    "site.base_url must start with http:// or https:// (got {url:?})"
                )));
            }
        }
        if self.serve.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "serve.poll_interval_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Apply environment/CLI overrides on top of the file layer, then
    /// re-validate.
    pub fn apply_overrides(&mut self, overrides: Overrides) -> Result<(), ConfigError> {
        if let Some(content) = overrides.content {
            self.paths.content = content;
        }
        if let Some(static_dir) = overrides.static_dir {
            self.paths.static_dir = static_dir;
        }
        if let Some(output) = overrides.output {
            self.paths.output = output;
        }
        if let Some(base_path) = overrides.base_path {
            self.site.base_path = Some(base_path);
        }
        if let Some(base_url) = overrides.base_url {
            self.site.base_url = Some(base_url);
        }
        self.validate()
    }
}

/// Highest-precedence layer, filled from CLI flags and environment variables.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub content: Option<PathBuf>,
    pub static_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub base_path: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory holding `site.json`, `artists.json` and `team.json`.
    pub content: PathBuf,
    /// Static tree copied verbatim into the output root.
    pub static_dir: PathBuf,
    /// Output directory. Destroyed and recreated on every build.
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            content: PathBuf::from("content"),
            static_dir: PathBuf::from("static"),
            output: PathBuf::from("dist"),
        }
    }
}

/// URL settings. Both only affect link and canonical generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteUrlConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HomeConfig {
    /// Number of leading roster entries shown on the home page.
    pub featured_count: usize,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self { featured_count: 6 }
    }
}

/// Dev server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    pub port: u16,
    pub poll_interval_ms: u64,
    pub debounce_ms: u64,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            poll_interval_ms: 500,
            debounce_ms: 150,
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Secondary text: labels, captions, photo credits.
    pub text_muted: String,
    pub border: String,
    /// Accent used for links and the hero call-to-action.
    pub accent: String,
    pub accent_hover: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#fbf8f3".to_string(),
            text: "#1c1917".to_string(),
            text_muted: "#6b6259".to_string(),
            border: "#e4ddd2".to_string(),
            accent: "#7a1f2b".to_string(),
            accent_hover: "#5a1620".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#121010".to_string(),
            text: "#f1ece4".to_string(),
            text_muted: "#a39a8f".to_string(),
            border: "#3a3330".to_string(),
            accent: "#d9a25f".to_string(),
            accent_hover: "#f0c27f".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(RosterConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value. `Ok(None)` if it does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<RosterConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: RosterConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `roster.toml` (or whatever `path` names), falling back to defaults.
pub fn load_config(path: &Path) -> Result<RosterConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    if overlay.is_some() {
        tracing::debug!("loaded config from {}", path.display());
    }
    resolve_config(overlay)
}

/// Returns a fully-commented stock `roster.toml`. Used by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Opera Roster Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Paths
# ---------------------------------------------------------------------------
[paths]
# Directory holding site.json, artists.json and (optionally) team.json.
content = "content"

# Static tree copied verbatim into the output root (static/assets -> /assets).
static_dir = "static"

# Output directory. It is deleted and recreated on every build.
output = "dist"

# ---------------------------------------------------------------------------
# Site URLs (override with BASE_PATH / SITE_URL)
# ---------------------------------------------------------------------------
[site]
# Deploy the whole site under a URL subdirectory.
# base_path = "/roster"

# Absolute origin for canonical links. When set, sitemap.xml is generated.
# base_url = "https://agency.example"

# ---------------------------------------------------------------------------
# Home page
# ---------------------------------------------------------------------------
[home]
# Number of leading roster entries shown in the featured grid.
featured_count = 6

# ---------------------------------------------------------------------------
# Dev server
# ---------------------------------------------------------------------------
[serve]
port = 8000

# How often the content and static trees are scanned for changes.
poll_interval_ms = 500

# Quiet period after a change before the rebuild starts.
debounce_ms = 150

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#fbf8f3"
text = "#1c1917"
text_muted = "#6b6259"    # Labels, captions, photo credits
border = "#e4ddd2"
accent = "#7a1f2b"        # Links, call-to-action
accent_hover = "#5a1620"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#121010"
text = "#f1ece4"
text_muted = "#a39a8f"
border = "#3a3330"
accent = "#d9a25f"
accent_hover = "#f0c27f"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-accent: {light_accent};
    --color-accent-hover: {light_accent_hover};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-accent: {dark_accent};
        --color-accent-hover: {dark_accent_hover};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_accent = colors.light.accent,
        light_accent_hover = colors.light.accent_hover,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_accent = colors.dark.accent,
        dark_accent_hover = colors.dark.accent_hover,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = RosterConfig::default();
        assert_eq!(config.paths.content, PathBuf::from("content"));
        assert_eq!(config.paths.output, PathBuf::from("dist"));
        assert_eq!(config.home.featured_count, 6);
        assert_eq!(config.serve.port, 8000);
        assert!(config.site.base_url.is_none());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[colors.light]
background = "#fafafa"
"##;
        let config: RosterConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.colors.light.background, "#fafafa");
        assert_eq!(config.colors.light.text, "#1c1917");
        assert_eq!(config.colors.dark.background, "#121010");
        assert_eq!(config.serve.poll_interval_ms, 500);
    }

    #[test]
    fn generate_css_uses_config_colors() {
        let mut colors = ColorConfig::default();
        colors.light.background = "#f0f0f0".to_string();
        colors.dark.background = "#1a1a1a".to_string();

        let css = generate_color_css(&colors);
        assert!(css.contains("--color-bg: #f0f0f0"));
        assert!(css.contains("--color-bg: #1a1a1a"));
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.home.featured_count, 6);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"
[site]
base_url = "https://example.com"

[home]
featured_count = 3
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.site.base_url.as_deref(), Some("https://example.com"));
        assert_eq!(config.home.featured_count, 3);
        assert_eq!(config.serve.port, 8000);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "[home\nfeatured_count = ").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "[home]\nfeatured = 3\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn validate_rejects_relative_base_url() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "[site]\nbase_url = \"example.com\"\n").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_zero_poll_interval() {
        let mut config = RosterConfig::default();
        config.serve.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn overrides_win_over_file_values() {
        let mut config = RosterConfig::default();
        config.site.base_path = Some("/from-file".into());
        config
            .apply_overrides(Overrides {
                output: Some(PathBuf::from("public")),
                base_path: Some("/from-env".into()),
                ..Overrides::default()
            })
            .unwrap();
        assert_eq!(config.paths.output, PathBuf::from("public"));
        assert_eq!(config.site.base_path.as_deref(), Some("/from-env"));
        assert_eq!(config.paths.content, PathBuf::from("content"));
    }

    #[test]
    fn overrides_are_validated() {
        let mut config = RosterConfig::default();
        let result = config.apply_overrides(Overrides {
            base_url: Some("ftp://nope".into()),
            ..Overrides::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let parsed: RosterConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = RosterConfig::default();
        assert_eq!(parsed.home.featured_count, defaults.home.featured_count);
        assert_eq!(parsed.serve.port, defaults.serve.port);
        assert_eq!(parsed.paths.static_dir, defaults.paths.static_dir);
        assert_eq!(parsed.colors.dark.accent, defaults.colors.dark.accent);
        assert_eq!(parsed.colors.light.border, defaults.colors.light.border);
    }
}
