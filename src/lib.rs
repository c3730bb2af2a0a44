//! # Opera Roster
//!
//! A static site generator for an opera artist-management agency. Three JSON
//! files describe the agency and its roster; the builder turns them into a
//! plain HTML site with a home page, a searchable roster, one profile page
//! per artist, and about, contact and 404 pages.
//!
//! # Architecture
//!
//! ```text
//! content/site.json      ┐
//! content/artists.json   ├─ load + validate ─→ render (maud) ─→ dist/
//! content/team.json      ┘                         ↑
//! static/                 ── copied verbatim ──→ AssetIndex
//! ```
//!
//! A build is a pure function of its inputs: the same content and static tree
//! always produce byte-identical output. The output directory is wiped and
//! rewritten on every run, but only after content has loaded and validated,
//! so a broken `artists.json` never destroys a working site.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Content records: `Site`, `Artist`, `Photo`, `TeamMember` |
//! | [`content`] | Reads `site.json`, `artists.json` and the optional `team.json` |
//! | [`validate`] | Slug rules and uniqueness |
//! | [`config`] | Layered `roster.toml` loading, overrides and color CSS |
//! | [`links`] | Base path and canonical URL resolution |
//! | [`assets`] | Static tree copy, placeholder portrait, materialized-asset index |
//! | [`text`] | HTML escaping and search normalization |
//! | [`render`] | Maud page templates, robots.txt and sitemap.xml |
//! | [`generate`] | The site builder that ties everything together |
//! | [`watch`] | Modification-time snapshots for change detection |
//! | [`server`] | Development server with live reload |
//! | [`download`] | Fetches portraits from their recorded source URLs |
//! | [`imaging`] | Pure-Rust cover crop used by the importer |
//! | [`import`] | Imports a local image as an artist portrait |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/). Templates are
//! Rust code, so a malformed page is a compile error and every interpolated
//! value is escaped exactly once.
//!
//! ## Assets Are an Input, Not a Lookup
//!
//! Renderers never touch the filesystem. After the static tree is copied, the
//! builder scans it once into an [`assets::AssetIndex`]; templates ask the
//! index whether a portrait exists and fall back to the placeholder when it
//! does not.
//!
//! ## No Globals in the Dev Server
//!
//! The live-reload channel and rebuild flags live on an explicit
//! [`server::ServerContext`] shared through axum state.

pub mod assets;
pub mod config;
pub mod content;
pub mod download;
pub mod generate;
pub mod imaging;
pub mod import;
pub mod links;
pub mod output;
pub mod render;
pub mod server;
pub mod text;
pub mod types;
pub mod validate;
pub mod watch;

#[cfg(test)]
pub(crate) mod test_helpers;
