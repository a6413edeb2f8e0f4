//! Fetching for Kiln.
//!
//! This crate is the narrow interface version search uses to reach
//! repositories:
//! - [`Fetch`] turns a URL into bytes and reports a missing document as
//!   [`FetchError::NotFound`], distinct from every other failure.
//! - [`HttpFetcher`] serves `http(s)` URLs through a blocking client and
//!   `file://` URLs or bare paths from disk.
//! - [`MemoryFetcher`] serves canned documents, for tests and offline runs.
//! - [`parse_metadata`], [`parse_listing`] and [`parse_search_table`] turn
//!   the fetched documents into version lists.

mod index;
mod memory;
pub mod url;

pub use index::{parse_listing, parse_metadata, parse_search_table};
pub use memory::MemoryFetcher;
pub use url::HttpFetcher;

use thiserror::Error;

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("malformed index document: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

impl FetchError {
    /// Whether the document simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }
}

/// Something that can retrieve a document by URL.
pub trait Fetch {
    /// Fetch the raw bytes at `url`.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    /// Fetch `url` as text, replacing invalid UTF-8.
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let bytes = self.fetch(url)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl<F: Fetch + ?Sized> Fetch for std::sync::Arc<F> {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(url)
    }
}

impl<F: Fetch + ?Sized> Fetch for &F {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(url)
    }
}
