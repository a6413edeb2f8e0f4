//! Parsers for the documents repositories serve about an artifact.

use crate::FetchError;
use once_cell::sync::Lazy;
use regex::Regex;
use roxmltree::Document;

static ANCHOR_HREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?\bhref\s*=\s*["']([^"']*)["']"#).expect("anchor pattern")
});

static GRID_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<table[^>]*class\s*=\s*["'][^"']*\bgrid\b[^"']*["'][^>]*>(.*?)</table>"#)
        .expect("table pattern")
});

static ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").expect("row pattern"));

static CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<td[^>]*>(.*?)</td>").expect("cell pattern"));

static LINK_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<a[^>]*>(.*?)</a>").expect("link pattern"));

/// Versions listed in a `maven-metadata.xml` document, newest first.
///
/// The document lists versions oldest first under
/// `metadata/versioning/versions/version`; the order is reversed so that
/// callers try the most recent release first.
pub fn parse_metadata(xml: &str) -> Result<Vec<String>, FetchError> {
    let document = Document::parse(xml)?;
    let mut versions: Vec<String> = document
        .descendants()
        .filter(|node| node.has_tag_name("version"))
        .filter(|node| node.parent().is_some_and(|p| p.has_tag_name("versions")))
        .filter_map(|node| node.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect();
    versions.reverse();
    Ok(versions)
}

/// Directory names scraped from an HTML directory listing.
///
/// Every anchor whose `href` ends in `/` names a subdirectory: the last
/// path segment of the link, without the slash. Names are sorted in
/// descending string order.
pub fn parse_listing(html: &str) -> Vec<String> {
    let mut names: Vec<String> = ANCHOR_HREF
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .filter_map(|href| href.as_str().trim().strip_suffix('/'))
        .filter_map(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty() && *name != ".." && *name != ".")
        .map(str::to_string)
        .collect();
    names.sort();
    names.dedup();
    names.reverse();
    names
}

/// The link text of the first cell of each row of a `table.grid`, as
/// published by package search sites.
pub fn parse_search_table(html: &str) -> Vec<String> {
    let Some(table) = GRID_TABLE.captures(html).and_then(|caps| caps.get(1)) else {
        return Vec::new();
    };
    ROW.captures_iter(table.as_str())
        .filter_map(|row| {
            let cells = row.get(1)?.as_str();
            let first = CELL.captures(cells)?.get(1)?.as_str();
            let text = LINK_TEXT.captures(first)?.get(1)?.as_str().trim();
            (!text.is_empty()).then(|| text.to_string())
        })
        .collect()
}
