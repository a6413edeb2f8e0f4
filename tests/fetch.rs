//! Integration tests for kiln-fetch crate.

use kiln_fetch::url::{is_http, scheme};
use kiln_fetch::{
    Fetch, FetchError, HttpFetcher, MemoryFetcher, parse_listing, parse_metadata,
    parse_search_table,
};
use std::fs;
use tempfile::TempDir;

const METADATA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata>
  <groupId>org.x</groupId>
  <artifactId>lib</artifactId>
  <version>9.9</version>
  <versioning>
    <latest>1.2</latest>
    <versions>
      <version>1.0</version>
      <version>1.1</version>
      <version>1.2</version>
    </versions>
  </versioning>
</metadata>"#;

// Index documents

#[test]
fn test_metadata_newest_first() {
    assert_eq!(parse_metadata(METADATA).unwrap(), vec!["1.2", "1.1", "1.0"]);
}

#[test]
fn test_metadata_malformed() {
    assert!(matches!(
        parse_metadata("<metadata><versions>"),
        Err(FetchError::Xml(_))
    ));
}

#[test]
fn test_directory_listing() {
    let html = r#"<html><body><pre>
<a href="../">../</a>
<a href="1.0/">1.0/</a>
<a href="2.0/">2.0/</a>
<a href="maven-metadata.xml">maven-metadata.xml</a>
</pre></body></html>"#;
    assert_eq!(parse_listing(html), vec!["2.0", "1.0"]);
}

#[test]
fn test_search_table() {
    let html = r#"<table class="grid versions">
<tr><th>Version</th></tr>
<tr><td><a class="vbtn" href="lib/3.1">3.1</a></td><td>42</td></tr>
<tr><td><a href="lib/3.0">3.0</a></td><td>17</td></tr>
</table>"#;
    assert_eq!(parse_search_table(html), vec!["3.1", "3.0"]);
    assert!(parse_search_table("<table><tr><td>1.0</td></tr></table>").is_empty());
}

// Fetchers

#[test]
fn test_memory_fetcher() {
    let fetcher = MemoryFetcher::new()
        .with("https://repo/a", "alpha")
        .fail("https://repo/broken");

    assert_eq!(fetcher.fetch_text("https://repo/a").unwrap(), "alpha");
    assert!(fetcher.fetch("https://repo/missing").unwrap_err().is_not_found());
    assert!(matches!(
        fetcher.fetch("https://repo/broken"),
        Err(FetchError::Status { status: 500, .. })
    ));
    assert_eq!(
        fetcher.requests(),
        vec!["https://repo/a", "https://repo/missing", "https://repo/broken"]
    );
}

#[test]
fn test_file_urls() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("maven-metadata.xml");
    fs::write(&file, METADATA).unwrap();

    let fetcher = HttpFetcher::new().unwrap();
    let url = format!("file://{}", file.display());
    assert_eq!(fetcher.fetch_text(&url).unwrap(), METADATA);
    assert_eq!(
        fetcher.fetch(&file.display().to_string()).unwrap(),
        METADATA.as_bytes()
    );

    let missing = format!("file://{}", dir.path().join("nope").display());
    assert!(fetcher.fetch(&missing).unwrap_err().is_not_found());
}

#[test]
fn test_unsupported_scheme() {
    let fetcher = HttpFetcher::new().unwrap();
    assert!(matches!(
        fetcher.fetch("ftp://repo/lib"),
        Err(FetchError::UnsupportedScheme(s)) if s == "ftp"
    ));
}

#[test]
fn test_schemes() {
    assert_eq!(scheme("https://repo"), Some("https"));
    assert_eq!(scheme("/var/repo"), None);
    assert!(is_http("http://repo"));
    assert!(!is_http("file:///var/repo"));
}
