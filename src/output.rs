//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Each entity (page,
//! artist, download) leads with its identity, either a label or an artist
//! name with positional index. Filesystem paths follow as secondary context
//! after `→` or on indented lines.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//! Artists → artists/index.html
//!     001 Ana Lee → artists/ana-lee/index.html
//!     002 Bo Kim → artists/bo-kim/index.html
//! About → about/index.html
//! Contact → contact/index.html
//! Not found → 404.html
//! robots.txt → robots.txt
//!
//! Built 2 artists, 8 files, 3 static files copied into dist
//! ```
//!
//! ## Check
//!
//! ```text
//! Test Agency
//! 001 Ana Lee (ana-lee)
//!     Soprano, Berlin
//!     Photo: /assets/images/artists/ana-lee.jpg
//!
//! Content OK: 1 artist, 0 team members
//! ```
//!
//! ## Download
//!
//! ```text
//! 001 Ana Lee: fetched 48213 bytes
//!     https://example.com/ana.jpg → static/assets/images/artists/ana-lee.jpg
//! 002 Bo Kim: skipped (no sourceUrl)
//!
//! 1 fetched, 1 skipped, 0 failed
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::content::Content;
use crate::download::{DownloadReport, Outcome};
use crate::generate::BuildSummary;
use crate::import::ImportResult;
use crate::types::non_blank;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

/// Output paths always display with forward slashes.
fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn is_artist_page(path: &str) -> bool {
    path.starts_with("artists/") && path != "artists/index.html"
}

// ============================================================================
// Build
// ============================================================================

/// Format the result of `build`.
///
/// Artist pages nest under the roster index with their position in the
/// roster.
pub fn format_build_output(summary: &BuildSummary) -> Vec<String> {
    let mut lines = Vec::new();
    let mut artist_pos = 0;

    for page in &summary.pages {
        let path = display_path(&page.path);
        if is_artist_page(&path) {
            artist_pos += 1;
            lines.push(format!(
                "{}{} {} \u{2192} {}",
                indent(1),
                format_index(artist_pos),
                page.label,
                path
            ));
        } else {
            lines.push(format!("{} \u{2192} {}", page.label, path));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Built {}, {}, {} copied into {}",
        plural(summary.artist_count, "artist", "artists"),
        plural(summary.pages.len(), "file", "files"),
        plural(summary.static_files, "static file", "static files"),
        display_path(&summary.output_dir)
    ));
    if !summary.sitemap_written {
        lines.push("No base URL configured: sitemap.xml skipped".to_string());
    }
    lines
}

pub fn print_build_output(summary: &BuildSummary) {
    for line in format_build_output(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the content inventory shown by `check`.
pub fn format_check_output(content: &Content) -> Vec<String> {
    let mut lines = vec![content.site.agency_name.clone()];

    for (i, artist) in content.artists.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            artist.name,
            artist.slug
        ));
        let details: Vec<&str> = [artist.label(), non_blank(artist.location.as_deref())]
            .into_iter()
            .flatten()
            .collect();
        if !details.is_empty() {
            lines.push(format!("{}{}", indent(1), details.join(", ")));
        }
        match artist.photo.as_ref().and_then(|p| non_blank(p.path.as_deref())) {
            Some(path) => lines.push(format!("{}Photo: {}", indent(1), path)),
            None => lines.push(format!("{}Photo: placeholder", indent(1))),
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Content OK: {}, {}",
        plural(content.artists.len(), "artist", "artists"),
        plural(content.team.len(), "team member", "team members")
    ));
    lines
}

pub fn print_check_output(content: &Content) {
    for line in format_check_output(content) {
        println!("{}", line);
    }
}

// ============================================================================
// Download
// ============================================================================

/// Format a download batch, one entry per selected artist.
pub fn format_download_report(report: &DownloadReport) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, item) in report.items.iter().enumerate() {
        let status = match &item.outcome {
            Outcome::Fetched { bytes } => format!("fetched {} bytes", bytes),
            Outcome::WouldFetch => "would fetch".to_string(),
            Outcome::Skipped(reason) => format!("skipped ({})", reason),
            Outcome::Failed(err) => format!("FAILED: {}", err),
        };
        lines.push(format!("{} {}: {}", format_index(i + 1), item.name, status));
        if let (Some(url), Some(target)) = (&item.url, &item.target) {
            lines.push(format!(
                "{}{} \u{2192} {}",
                indent(1),
                url,
                display_path(target)
            ));
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    let summary = if report.dry_run {
        format!(
            "Dry run: {} would be fetched, {} skipped",
            report.would_fetch(),
            report.skipped()
        )
    } else {
        format!(
            "{} fetched, {} skipped, {} failed",
            report.fetched(),
            report.skipped(),
            report.failed()
        )
    };
    lines.push(summary);
    lines
}

pub fn print_download_report(report: &DownloadReport) {
    for line in format_download_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Import
// ============================================================================

pub fn format_import_result(slug: &str, result: &ImportResult) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{}: {}x{} \u{2192} {}x{}",
            slug, result.source.width, result.source.height, result.width, result.height
        ),
        format!("{}Output: {}", indent(1), display_path(&result.output)),
        format!("{}Public path: {}", indent(1), result.public_path),
    ];
    if result.artist_updated {
        lines.push(format!("{}artists.json: photo.path updated", indent(1)));
    } else {
        lines.push(format!(
            "{}artists.json: no entry for {}, set photo.path by hand",
            indent(1),
            slug
        ));
    }
    lines
}

pub fn print_import_result(slug: &str, result: &ImportResult) {
    for line in format_import_result(slug, result) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
