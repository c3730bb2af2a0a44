//! Text helpers shared by the renderer: escaping, search normalization,
//! paragraph splitting.
//!
//! ## Escaping
//!
//! Maud escapes `&`, `<`, `>` and `"` on interpolation but leaves `'` alone.
//! User-supplied text goes through [`Text`] instead, which escapes all five
//! reserved characters. `Text` renders pre-escaped, so maud does not escape
//! it a second time.

use maud::Render;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Escape the five HTML-reserved characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    push_escaped(&mut out, input);
    out
}

fn push_escaped(out: &mut String, input: &str) {
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// User-supplied text, escaped once when spliced into a maud template.
///
/// Works for both element content and attribute values.
#[derive(Debug, Clone, Copy)]
pub struct Text<'a>(pub &'a str);

impl Render for Text<'_> {
    fn render_to(&self, buffer: &mut String) {
        push_escaped(buffer, self.0);
    }
}

/// Normalize text for the client-side roster filter.
///
/// Lowercases, decomposes (NFKD), drops combining marks and collapses runs of
/// whitespace, so `"José  Plácido"` becomes `"jose placido"`. The embedded
/// filter script applies the same steps to the query.
pub fn normalize_search(input: &str) -> String {
    let folded: String = input
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case- and diacritic-insensitive substring match.
pub fn search_matches(haystack: &str, query: &str) -> bool {
    normalize_search(haystack).contains(&normalize_search(query))
}

/// Truncate to at most `max` characters, appending `…` when shortened.
///
/// Cuts on a character boundary, never inside a multi-byte sequence.
pub fn truncate_chars(text: &str, max: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}…", text[..cut].trim_end()),
    }
}

/// Split free text into paragraphs on blank lines.
///
/// Single newlines inside a paragraph are kept as spaces.
pub fn paragraphs(input: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                out.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current.join(" "));
    }
    out
}
