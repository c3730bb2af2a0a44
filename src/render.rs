//! Page templates.
//!
//! Pure functions from content + [`RenderContext`] to page text. Nothing in
//! here touches the filesystem: photo availability comes from the
//! [`AssetIndex`] the builder passes in, and every internal link is routed
//! through [`SiteLinks::apply_base`].
//!
//! ## Pages
//!
//! | Function | Page path | Output file |
//! |----------|-----------|-------------|
//! | [`render_home`] | `/` | `index.html` |
//! | [`render_artist_index`] | `/artists/` | `artists/index.html` |
//! | [`render_artist_page`] | `/artists/<slug>/` | `artists/<slug>/index.html` |
//! | [`render_about`] | `/about/` | `about/index.html` |
//! | [`render_contact`] | `/contact/` | `contact/index.html` |
//! | [`render_not_found`] | n/a | `404.html` |
//! | [`render_robots`] | n/a | `robots.txt` |
//! | [`render_sitemap`] | n/a | `sitemap.xml` |
//!
//! HTML is generated with [maud](https://maud.lambda.xyz/). User-supplied
//! strings are spliced as [`Text`], which escapes `'` in addition to maud's
//! default set.

use crate::assets::AssetIndex;
use crate::config::{self, ColorConfig};
use crate::links::SiteLinks;
use crate::text::{Text, escape_html, normalize_search, paragraphs, truncate_chars};
use crate::types::{Artist, Photo, Site, TeamMember, non_blank};
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS_STATIC: &str = include_str!("../theme/site.css");
const FILTER_JS: &str = include_str!("../theme/roster-filter.js");

const META_DESCRIPTION_LEN: usize = 160;

/// Everything page templates need besides the entity being rendered.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub site: &'a Site,
    pub team: &'a [TeamMember],
    pub links: &'a SiteLinks,
    pub assets: &'a AssetIndex,
    /// Full inline stylesheet, see [`stylesheet`].
    pub css: &'a str,
    pub featured_count: usize,
}

/// Top-level navigation sections, used to mark the current nav item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Home,
    Artists,
    About,
    Contact,
    Other,
}

const NAV: &[(Section, &str, &str)] = &[
    (Section::Home, "/", "Home"),
    (Section::Artists, "/artists/", "Artists"),
    (Section::About, "/about/", "About"),
    (Section::Contact, "/contact/", "Contact"),
];

/// Head metadata for one page.
struct PageMeta {
    title: String,
    description: String,
    /// Site-relative page path; `None` for pages without a canonical URL.
    path: Option<String>,
    section: Section,
    og_type: &'static str,
    /// Site-relative image path for `og:image`.
    image: Option<String>,
    noindex: bool,
}

/// Color variables followed by the embedded base stylesheet.
pub fn stylesheet(colors: &ColorConfig) -> String {
    format!("{}\n\n{}", config::generate_color_css(colors), CSS_STATIC)
}

/// Normalized text the roster filter matches against: name, label, location.
pub fn search_text(artist: &Artist) -> String {
    let parts = [
        Some(artist.name.as_str()),
        artist.label(),
        non_blank(artist.location.as_deref()),
    ];
    let joined = parts.into_iter().flatten().collect::<Vec<_>>().join(" ");
    normalize_search(&joined)
}

/// Every page path listed in the sitemap, in output order.
pub fn page_paths(artists: &[Artist]) -> Vec<String> {
    let mut paths = vec!["/".to_string(), "/artists/".to_string()];
    paths.extend(artists.iter().map(Artist::page_path));
    paths.push("/about/".to_string());
    paths.push("/contact/".to_string());
    paths
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(ctx: &RenderContext, meta: &PageMeta, content: Markup) -> Markup {
    let canonical = meta
        .path
        .as_deref()
        .and_then(|p| ctx.links.canonical_url(p));
    let og_image = meta
        .image
        .as_deref()
        .and_then(|p| ctx.links.canonical_url(p));

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (Text(&meta.title)) }
                meta name="description" content=(Text(&meta.description));
                @if meta.noindex {
                    meta name="robots" content="noindex";
                }
                @if let Some(url) = &canonical {
                    link rel="canonical" href=(Text(url));
                    meta property="og:url" content=(Text(url));
                }
                meta property="og:site_name" content=(Text(&ctx.site.agency_name));
                meta property="og:title" content=(Text(&meta.title));
                meta property="og:description" content=(Text(&meta.description));
                meta property="og:type" content=(meta.og_type);
                @if let Some(image) = &og_image {
                    meta property="og:image" content=(Text(image));
                }
                style { (PreEscaped(ctx.css)) }
            }
            body {
                (site_header(ctx, meta.section))
                main { (content) }
                (site_footer(ctx))
            }
        }
    }
}

/// Renders the site header with the agency name and section navigation
fn site_header(ctx: &RenderContext, current: Section) -> Markup {
    html! {
        header.site-header {
            a.brand href=(ctx.links.apply_base("/")) { (Text(&ctx.site.agency_name)) }
            nav.site-nav aria-label="Main" {
                ul {
                    @for (section, path, label) in NAV {
                        li class=[(*section == current).then_some("current")] {
                            a href=(ctx.links.apply_base(path)) { (label) }
                        }
                    }
                }
            }
        }
    }
}

fn site_footer(ctx: &RenderContext) -> Markup {
    let site = ctx.site;
    html! {
        footer.site-footer {
            span.footer-agency { (Text(&site.agency_name)) }
            @if let Some(email) = non_blank(site.contact.email.as_deref()) {
                a href={ "mailto:" (Text(email.trim())) } { (Text(email.trim())) }
            }
            @if !site.links.is_empty() {
                ul.footer-links {
                    @for link in &site.links {
                        @if let Some(url) = safe_url(&link.url) {
                            li { a href=(Text(url)) rel="noopener" { (Text(&link.label)) } }
                        }
                    }
                }
            }
        }
    }
}

/// Roster card linking to an artist page.
pub fn artist_card(ctx: &RenderContext, artist: &Artist) -> Markup {
    let photo = artist.photo.as_ref();
    let src = ctx.assets.photo_or_placeholder(photo);
    let alt = portrait_alt(ctx.assets, photo, &artist.name);

    html! {
        li.artist-card data-search=(Text(&search_text(artist))) {
            a href=(ctx.links.apply_base(&artist.page_path())) {
                img src=(ctx.links.apply_base(src)) alt=(Text(&alt)) loading="lazy" width="400" height="500";
                span.name { (Text(&artist.name)) }
                @if let Some(label) = artist.label() {
                    span.label { (Text(label)) }
                }
                @if let Some(location) = non_blank(artist.location.as_deref()) {
                    span.location { (Text(location)) }
                }
            }
        }
    }
}

fn contact_items(ctx: &RenderContext) -> Markup {
    let contact = &ctx.site.contact;
    html! {
        @if let Some(email) = non_blank(contact.email.as_deref()) {
            div.contact-item {
                span.contact-label { "Email" }
                a href={ "mailto:" (Text(email.trim())) } { (Text(email.trim())) }
            }
        }
        @if let Some(phone) = non_blank(contact.phone.as_deref()) {
            div.contact-item {
                span.contact-label { "Phone" }
                a href={ "tel:" (tel_href(phone)) } { (Text(phone.trim())) }
            }
        }
        @if let Some(location) = non_blank(contact.location.as_deref()) {
            div.contact-item {
                span.contact-label { "Location" }
                span { (Text(location.trim())) }
            }
        }
    }
}

fn team_portrait(ctx: &RenderContext, member: &TeamMember) -> Markup {
    let photo = member.photo.as_ref();
    let src = ctx.assets.photo_or_placeholder(photo);
    let alt = portrait_alt(ctx.assets, photo, &member.name);
    html! {
        li.team-member {
            img src=(ctx.links.apply_base(src)) alt=(Text(&alt)) loading="lazy";
            h3 { (Text(&member.name)) }
            @if !member.title.trim().is_empty() {
                p.team-title { (Text(&member.title)) }
            }
            @if let Some(email) = non_blank(member.email.as_deref()) {
                a href={ "mailto:" (Text(email.trim())) } { (Text(email.trim())) }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Home: hero, featured artists, contact strip.
pub fn render_home(ctx: &RenderContext, artists: &[Artist]) -> Markup {
    let site = ctx.site;
    let featured = &artists[..artists.len().min(ctx.featured_count)];
    let title = match non_blank(site.tagline.as_deref()) {
        Some(tagline) => format!("{} · {}", site.agency_name, tagline.trim()),
        None => site.agency_name.clone(),
    };
    let meta = PageMeta {
        title,
        description: site_summary(site),
        path: Some("/".to_string()),
        section: Section::Home,
        og_type: "website",
        image: None,
        noindex: false,
    };

    let content = html! {
        section.hero {
            h1 { (Text(&site.agency_name)) }
            @if let Some(tagline) = non_blank(site.tagline.as_deref()) {
                p.tagline { (Text(tagline)) }
            }
            @for paragraph in paragraphs(&site.description) {
                p { (Text(&paragraph)) }
            }
            a.cta href=(ctx.links.apply_base("/artists/")) { "View the roster" }
        }
        @if !featured.is_empty() {
            section.featured aria-labelledby="featured-heading" {
                h2 id="featured-heading" { "Featured artists" }
                ul.artist-grid {
                    @for artist in featured {
                        (artist_card(ctx, artist))
                    }
                }
            }
        }
        @if !site.contact.is_empty() {
            section.contact-strip aria-label="Contact" {
                (contact_items(ctx))
            }
        }
    };

    base_document(ctx, &meta, content)
}

/// Artist index: search control plus the full roster grid.
pub fn render_artist_index(ctx: &RenderContext, artists: &[Artist]) -> Markup {
    let meta = PageMeta {
        title: format!("Artists · {}", ctx.site.agency_name),
        description: format!("The artist roster of {}.", ctx.site.agency_name),
        path: Some("/artists/".to_string()),
        section: Section::Artists,
        og_type: "website",
        image: None,
        noindex: false,
    };

    let content = html! {
        h1 { "Artists" }
        div.roster-search role="search" {
            label for="artist-search" { "Search the roster" }
            input id="artist-search" type="search" placeholder="Name, voice type or city" autocomplete="off" data-roster-filter;
            p.roster-count {
                span data-roster-count { (artists.len()) }
                " artists"
            }
        }
        ul.artist-grid id="roster" {
            @for artist in artists {
                (artist_card(ctx, artist))
            }
        }
        p.roster-empty data-roster-empty hidden { "No artists match your search." }
        script { (PreEscaped(FILTER_JS)) }
    };

    base_document(ctx, &meta, content)
}

/// Profile page for one artist.
pub fn render_artist_page(ctx: &RenderContext, artist: &Artist) -> Markup {
    let site = ctx.site;
    let photo = artist.photo.as_ref();
    let real_photo = ctx.assets.photo_path(photo);
    let src = real_photo.unwrap_or(crate::assets::PLACEHOLDER_PATH);
    let alt = portrait_alt(ctx.assets, photo, &artist.name);

    let mut bio = paragraphs(artist.bio.as_deref().unwrap_or_default());
    if bio.is_empty() {
        bio = paragraphs(&site.description);
    }
    let label_heading = if non_blank(artist.discipline.as_deref()).is_some() {
        "Discipline"
    } else {
        "Voice type"
    };
    let title = match artist.label() {
        Some(label) => format!("{}, {} · {}", artist.name, label, site.agency_name),
        None => format!("{} · {}", artist.name, site.agency_name),
    };
    let description = match bio.first() {
        Some(first) => truncate_chars(first, META_DESCRIPTION_LEN),
        None => format!("{} is represented by {}.", artist.name, site.agency_name),
    };
    let meta = PageMeta {
        title,
        description,
        path: Some(artist.page_path()),
        section: Section::Artists,
        og_type: "profile",
        image: real_photo.map(str::to_string),
        noindex: false,
    };

    let content = html! {
        nav.breadcrumb aria-label="Breadcrumb" {
            a href=(ctx.links.apply_base("/artists/")) { "Artists" }
            " › "
            (Text(&artist.name))
        }
        article.artist-profile {
            div.profile-main {
                header.profile-header {
                    h1 { (Text(&artist.name)) }
                    @if let Some(label) = artist.label() {
                        p.label { (Text(label)) }
                    }
                    @if let Some(location) = non_blank(artist.location.as_deref()) {
                        p.location { (Text(location)) }
                    }
                }
                section.bio {
                    @for paragraph in &bio {
                        p { (Text(paragraph)) }
                    }
                }
                @if !artist.repertoire_highlights.is_empty() {
                    section.repertoire {
                        h2 { "Repertoire highlights" }
                        ul {
                            @for role in &artist.repertoire_highlights {
                                li { (Text(role)) }
                            }
                        }
                    }
                }
                @if let Some(notes) = non_blank(artist.management_notes.as_deref()) {
                    section.management {
                        h2 { "Management" }
                        @for paragraph in paragraphs(notes) {
                            p { (Text(&paragraph)) }
                        }
                    }
                }
            }
            aside.profile-side {
                figure.portrait {
                    img src=(ctx.links.apply_base(src)) alt=(Text(&alt)) width="400" height="500";
                    @if real_photo.is_some() {
                        @if let Some(caption) = photo.and_then(photo_credit) {
                            (caption)
                        }
                    }
                }
                dl.facts {
                    @if let Some(label) = artist.label() {
                        dt { (label_heading) }
                        dd { (Text(label)) }
                    }
                    @if let Some(location) = non_blank(artist.location.as_deref()) {
                        dt { "Location" }
                        dd { (Text(location)) }
                    }
                    @if let Some(website) = artist.website.as_deref().and_then(safe_url) {
                        dt { "Website" }
                        dd { a href=(Text(website)) rel="noopener" { (Text(display_url(website))) } }
                    }
                    @if let Some(operabase) = artist.operabase_url.as_deref().and_then(safe_url) {
                        dt { "Operabase" }
                        dd { a href=(Text(operabase)) rel="noopener" { "Performance history" } }
                    }
                }
            }
        }
        p.back { a href=(ctx.links.apply_base("/artists/")) { "← All artists" } }
    };

    base_document(ctx, &meta, content)
}

/// About page: agency description and optional team listing.
pub fn render_about(ctx: &RenderContext) -> Markup {
    let site = ctx.site;
    let meta = PageMeta {
        title: format!("About · {}", site.agency_name),
        description: site_summary(site),
        path: Some("/about/".to_string()),
        section: Section::About,
        og_type: "website",
        image: None,
        noindex: false,
    };

    let content = html! {
        h1 { "About " (Text(&site.agency_name)) }
        @for paragraph in paragraphs(&site.description) {
            p { (Text(&paragraph)) }
        }
        @if !ctx.team.is_empty() {
            section.team {
                h2 { "Our team" }
                ul.team-list {
                    @for member in ctx.team {
                        li {
                            strong { (Text(&member.name)) }
                            @if !member.title.trim().is_empty() {
                                ", " (Text(&member.title))
                            }
                        }
                    }
                }
            }
        }
    };

    base_document(ctx, &meta, content)
}

/// Contact page: channels plus team portraits.
pub fn render_contact(ctx: &RenderContext) -> Markup {
    let site = ctx.site;
    let meta = PageMeta {
        title: format!("Contact · {}", site.agency_name),
        description: format!("How to reach {}.", site.agency_name),
        path: Some("/contact/".to_string()),
        section: Section::Contact,
        og_type: "website",
        image: None,
        noindex: false,
    };

    let content = html! {
        h1 { "Contact" }
        @if site.contact.is_empty() {
            p { "Contact details will be published soon." }
        } @else {
            section.contact-channels {
                (contact_items(ctx))
            }
        }
        @if !ctx.team.is_empty() {
            section.team {
                h2 { "Team" }
                ul.team-grid {
                    @for member in ctx.team {
                        (team_portrait(ctx, member))
                    }
                }
            }
        }
    };

    base_document(ctx, &meta, content)
}

pub fn render_not_found(ctx: &RenderContext) -> Markup {
    let meta = PageMeta {
        title: format!("Page not found · {}", ctx.site.agency_name),
        description: "The requested page could not be found.".to_string(),
        path: None,
        section: Section::Other,
        og_type: "website",
        image: None,
        noindex: true,
    };

    let content = html! {
        h1 { "Page not found" }
        p { "The page you were looking for does not exist or has moved." }
        p {
            a href=(ctx.links.apply_base("/")) { "Back to the home page" }
            " · "
            a href=(ctx.links.apply_base("/artists/")) { "Browse the roster" }
        }
    };

    base_document(ctx, &meta, content)
}

// ============================================================================
// Text outputs
// ============================================================================

pub fn render_robots(links: &SiteLinks) -> String {
    match links.canonical_url("/sitemap.xml") {
        Some(url) => format!("User-agent: *\nAllow: /\n\nSitemap: {url}\n"),
        None => "User-agent: *\nAllow: /\n".to_string(),
    }
}

/// `None` when no base URL is configured: a sitemap needs absolute URLs.
pub fn render_sitemap(links: &SiteLinks, artists: &[Artist]) -> Option<String> {
    links.base_url()?;
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for path in page_paths(artists) {
        let loc = links.canonical_url(&path)?;
        xml.push_str(&format!("  <url><loc>{}</loc></url>\n", escape_html(&loc)));
    }
    xml.push_str("</urlset>\n");
    Some(xml)
}

// ============================================================================
// Helpers
// ============================================================================

fn site_summary(site: &Site) -> String {
    match paragraphs(&site.description).first() {
        Some(first) => truncate_chars(first, META_DESCRIPTION_LEN),
        None => site.agency_name.clone(),
    }
}

fn portrait_alt(assets: &AssetIndex, photo: Option<&Photo>, name: &str) -> String {
    let custom = photo.and_then(|p| non_blank(p.alt.as_deref()));
    match (assets.photo_path(photo), custom) {
        (Some(_), Some(alt)) => alt.trim().to_string(),
        _ => format!("Portrait of {name}"),
    }
}

/// Credit line for a real photo; `None` when there is nothing to credit.
fn photo_credit(photo: &Photo) -> Option<Markup> {
    let credit = non_blank(photo.credit.as_deref());
    let source = photo.source_url.as_deref().and_then(safe_url);
    if credit.is_none() && source.is_none() {
        return None;
    }
    Some(html! {
        figcaption.credit {
            @match (credit, source) {
                (Some(credit), Some(source)) => {
                    "Photo: " a href=(Text(source)) rel="noopener" { (Text(credit)) }
                }
                (Some(credit), None) => {
                    "Photo: " (Text(credit))
                }
                (None, Some(source)) => {
                    a href=(Text(source)) rel="noopener" { "Photo source" }
                }
                (None, None) => {}
            }
        }
    })
}

/// Only web and mail links make it into `href` attributes.
fn safe_url(url: &str) -> Option<&str> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    (lower.starts_with("https://") || lower.starts_with("http://") || lower.starts_with("mailto:"))
        .then_some(url)
}

/// `https://www.example.com/` → `www.example.com`
fn display_url(url: &str) -> &str {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
}

fn tel_href(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::PLACEHOLDER_PATH;
    use crate::test_helpers::{artist, sample_site};
    use crate::types::{Contact, ExternalLink};

    struct Fixture {
        site: Site,
        team: Vec<TeamMember>,
        links: SiteLinks,
        assets: AssetIndex,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                site: sample_site(),
                team: Vec::new(),
                links: SiteLinks::default(),
                assets: [PLACEHOLDER_PATH, "/assets/images/artists/ana-lee.jpg"]
                    .into_iter()
                    .collect(),
            }
        }

        fn ctx(&self) -> RenderContext<'_> {
            RenderContext {
                site: &self.site,
                team: &self.team,
                links: &self.links,
                assets: &self.assets,
                css: "",
                featured_count: 2,
            }
        }
    }

    fn ana() -> Artist {
        Artist {
            discipline: Some("Soprano".into()),
            location: Some("Berlin".into()),
            bio: Some("First paragraph.\n\nSecond paragraph.".into()),
            repertoire_highlights: vec!["Tosca".into(), "Mimì".into()],
            website: Some("https://analee.example/".into()),
            photo: Some(Photo {
                path: Some("/assets/images/artists/ana-lee.jpg".into()),
                alt: Some("Ana on stage".into()),
                credit: Some("J. Smith".into()),
                source_url: Some("https://photos.example/ana".into()),
            }),
            ..artist("ana-lee", "Ana Lee")
        }
    }

    #[test]
    fn home_lists_featured_subset_only() {
        let f = Fixture::new();
        let roster = vec![
            artist("a-one", "Artist One"),
            artist("b-two", "Artist Two"),
            artist("c-three", "Artist Three"),
        ];
        let html = render_home(&f.ctx(), &roster).into_string();
        assert!(html.contains("Test Agency"));
        assert!(html.contains(r#"href="/artists/a-one/""#));
        assert!(html.contains(r#"href="/artists/b-two/""#));
        assert!(!html.contains("Artist Three"));
    }

    #[test]
    fn home_contact_strip() {
        let mut f = Fixture::new();
        f.site.contact = Contact {
            email: Some("info@agency.example".into()),
            phone: Some("+49 30 1234 567".into()),
            location: Some("Berlin".into()),
        };
        let html = render_home(&f.ctx(), &[]).into_string();
        assert!(html.contains(r#"href="mailto:info@agency.example""#));
        assert!(html.contains(r#"href="tel:+49301234567""#));
        assert!(html.contains("contact-strip"));
        assert!(!html.contains("Featured artists"));
    }

    #[test]
    fn blank_contact_renders_placeholder_text() {
        let mut f = Fixture::new();
        f.site.contact = Contact {
            email: Some(String::new()),
            phone: Some("   ".into()),
            location: None,
        };
        let home = render_home(&f.ctx(), &[]).into_string();
        assert!(!home.contains(r#"class="contact-strip""#));

        let contact = render_contact(&f.ctx()).into_string();
        assert!(contact.contains("Contact details will be published soon."));
        assert!(!contact.contains(r#"class="contact-channels""#));
    }

    #[test]
    fn artist_index_has_filter_and_all_cards() {
        let f = Fixture::new();
        let roster = vec![
            artist("a-one", "José Plácido"),
            artist("b-two", "Artist Two"),
            artist("c-three", "Artist Three"),
        ];
        let html = render_artist_index(&f.ctx(), &roster).into_string();
        assert!(html.contains("data-roster-filter"));
        assert!(html.contains(r#"data-search="jose placido""#));
        assert!(html.contains("Artist Three"));
        assert!(html.contains("<script>"));
    }

    #[test]
    fn artist_page_profile_content() {
        let f = Fixture::new();
        let html = render_artist_page(&f.ctx(), &ana()).into_string();
        assert!(html.contains("<h1>Ana Lee</h1>"));
        assert!(html.contains("Soprano"));
        assert!(html.contains("<dt>Discipline</dt>"));
        assert!(html.contains("Berlin"));
        assert!(html.contains("<p>Second paragraph.</p>"));
        assert!(html.contains("<li>Mimì</li>"));
        assert!(html.contains(r#"src="/assets/images/artists/ana-lee.jpg""#));
        assert!(html.contains(r#"alt="Ana on stage""#));
        assert!(html.contains(r#"<a href="https://photos.example/ana" rel="noopener">J. Smith</a>"#));
        assert!(html.contains("analee.example"));
    }

    #[test]
    fn artist_page_voice_type_label() {
        let f = Fixture::new();
        let artist = Artist {
            voice_type: Some("Bass-baritone".into()),
            ..artist("bo-kim", "Bo Kim")
        };
        let html = render_artist_page(&f.ctx(), &artist).into_string();
        assert!(html.contains("<dt>Voice type</dt>"));
        assert!(html.contains("Bass-baritone"));
    }

    #[test]
    fn artist_page_falls_back_to_site_description() {
        let f = Fixture::new();
        let html = render_artist_page(&f.ctx(), &artist("bo-kim", "Bo Kim")).into_string();
        assert!(html.contains("An agency for singers."));
        assert!(!html.contains("Repertoire highlights"));
    }

    #[test]
    fn missing_photo_uses_placeholder_on_card_and_page() {
        let f = Fixture::new();
        let artist = Artist {
            photo: Some(Photo {
                path: Some("/assets/images/not-copied.jpg".into()),
                credit: Some("Nobody".into()),
                ..Photo::default()
            }),
            ..artist("bo-kim", "Bo Kim")
        };
        let card = artist_card(&f.ctx(), &artist).into_string();
        let page = render_artist_page(&f.ctx(), &artist).into_string();
        for html in [&card, &page] {
            assert!(html.contains(PLACEHOLDER_PATH));
            assert!(!html.contains("not-copied.jpg"));
        }
        assert!(!page.contains("Nobody"));
    }

    #[test]
    fn photo_outside_assets_is_ignored() {
        let mut f = Fixture::new();
        f.assets = ["/images/bo.jpg", PLACEHOLDER_PATH].into_iter().collect();
        let artist = Artist {
            photo: Some(Photo {
                path: Some("/images/bo.jpg".into()),
                ..Photo::default()
            }),
            ..artist("bo-kim", "Bo Kim")
        };
        let card = artist_card(&f.ctx(), &artist).into_string();
        assert!(card.contains(PLACEHOLDER_PATH));
    }

    #[test]
    fn user_text_escaped_exactly_once() {
        let f = Fixture::new();
        let artist = artist("ana-lee", r#"Ana <"Diva"> & Co's"#);
        let html = render_artist_page(&f.ctx(), &artist).into_string();
        assert!(html.contains("<h1>Ana &lt;&quot;Diva&quot;&gt; &amp; Co&#39;s</h1>"));
        assert!(!html.contains("&amp;lt;"));
        assert!(!html.contains("&amp;#39;"));
        assert!(!html.contains("<\"Diva\">"));
    }

    #[test]
    fn unsafe_urls_are_dropped() {
        let f = Fixture::new();
        let artist = Artist {
            website: Some("javascript:alert(1)".into()),
            ..artist("bo-kim", "Bo Kim")
        };
        let html = render_artist_page(&f.ctx(), &artist).into_string();
        assert!(!html.contains("javascript:"));
        assert!(!html.contains("<dt>Website</dt>"));
    }

    #[test]
    fn links_respect_base_path() {
        let mut f = Fixture::new();
        f.links = SiteLinks::new(Some("/roster"), None);
        let html = render_home(&f.ctx(), &[ana()]).into_string();
        assert!(html.contains(r#"href="/roster/artists/ana-lee/""#));
        assert!(html.contains(r#"src="/roster/assets/images/artists/ana-lee.jpg""#));
        assert!(html.contains(r#"href="/roster/about/""#));
    }

    #[test]
    fn canonical_and_open_graph_with_base_url() {
        let mut f = Fixture::new();
        f.links = SiteLinks::new(Some("/roster"), Some("https://example.com"));
        let html = render_artist_page(&f.ctx(), &ana()).into_string();
        assert!(html.contains(
            r#"<link rel="canonical" href="https://example.com/roster/artists/ana-lee/">"#
        ));
        assert!(html.contains(r#"<meta property="og:type" content="profile">"#));
        assert!(html.contains(
            r#"content="https://example.com/roster/assets/images/artists/ana-lee.jpg""#
        ));
    }

    #[test]
    fn no_canonical_without_base_url() {
        let f = Fixture::new();
        let html = render_about(&f.ctx()).into_string();
        assert!(!html.contains("rel=\"canonical\""));
    }

    #[test]
    fn nav_marks_current_section() {
        let f = Fixture::new();
        let html = render_contact(&f.ctx()).into_string();
        assert!(html.contains(r#"<li class="current"><a href="/contact/">Contact</a></li>"#));
    }

    #[test]
    fn about_and_contact_list_team() {
        let mut f = Fixture::new();
        f.team = vec![TeamMember {
            name: "Clara Weiss".into(),
            title: "Artist Manager".into(),
            email: Some("clara@agency.example".into()),
            photo: None,
        }];
        let about = render_about(&f.ctx()).into_string();
        assert!(about.contains("Clara Weiss"));
        assert!(about.contains("Artist Manager"));

        let contact = render_contact(&f.ctx()).into_string();
        assert!(contact.contains("team-grid"));
        assert!(contact.contains(PLACEHOLDER_PATH));
        assert!(contact.contains("mailto:clara@agency.example"));
    }

    #[test]
    fn footer_lists_external_links() {
        let mut f = Fixture::new();
        f.site.links = vec![ExternalLink {
            label: "Instagram".into(),
            url: "https://instagram.example/agency".into(),
        }];
        let html = render_about(&f.ctx()).into_string();
        assert!(html.contains(r#"href="https://instagram.example/agency""#));
    }

    #[test]
    fn not_found_is_noindex() {
        let f = Fixture::new();
        let html = render_not_found(&f.ctx()).into_string();
        assert!(html.contains("Page not found"));
        assert!(html.contains(r#"<meta name="robots" content="noindex">"#));
    }

    #[test]
    fn robots_without_base_url() {
        assert_eq!(render_robots(&SiteLinks::default()), "User-agent: *\nAllow: /\n");
    }

    #[test]
    fn robots_with_base_url() {
        let links = SiteLinks::new(None, Some("https://example.com"));
        assert_eq!(
            render_robots(&links),
            "User-agent: *\nAllow: /\n\nSitemap: https://example.com/sitemap.xml\n"
        );
    }

    #[test]
    fn sitemap_omitted_without_base_url() {
        assert!(render_sitemap(&SiteLinks::default(), &[ana()]).is_none());
    }

    #[test]
    fn sitemap_lists_every_page_once() {
        let links = SiteLinks::new(None, Some("https://example.com"));
        let roster = vec![ana(), artist("bo-kim", "Bo Kim")];
        let xml = render_sitemap(&links, &roster).unwrap();
        for path in [
            "https://example.com/",
            "https://example.com/artists/",
            "https://example.com/artists/ana-lee/",
            "https://example.com/artists/bo-kim/",
            "https://example.com/about/",
            "https://example.com/contact/",
        ] {
            let loc = format!("<loc>{path}</loc>");
            assert_eq!(xml.matches(&loc).count(), 1, "{path}");
        }
        assert_eq!(xml.matches("<url>").count(), 6);
        assert!(xml.starts_with("<?xml"));
    }

    #[test]
    fn search_text_includes_label_and_location() {
        let text = search_text(&ana());
        assert_eq!(text, "ana lee soprano berlin");
    }
}
