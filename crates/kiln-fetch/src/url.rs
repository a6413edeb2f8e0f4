//! URL fetching.

use crate::{Fetch, FetchError};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, trace};

/// Default timeout for HTTP requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default user agent.
const USER_AGENT: &str = concat!("kiln-fetch/", env!("CARGO_PKG_VERSION"));

/// Fetches `http(s)` URLs over the network and `file://` URLs or bare
/// paths from the local filesystem.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    fn fetch_http(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        trace!(%url, status = status.as_u16(), "response");

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes()?.to_vec())
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!(%url, "fetching");
        match scheme(url) {
            Some("http") | Some("https") => self.fetch_http(url),
            Some("file") => read_file(url.trim_start_matches("file://"), url),
            Some(other) => Err(FetchError::UnsupportedScheme(other.to_string())),
            None => read_file(url, url),
        }
    }
}

/// The scheme of `url`, if it has one.
pub fn scheme(url: &str) -> Option<&str> {
    let (scheme, _) = url.split_once("://")?;
    let valid = !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

/// Whether `url` is served over HTTP, the only kind of repository that
/// answers with a directory listing.
pub fn is_http(url: &str) -> bool {
    matches!(scheme(url), Some("http") | Some("https"))
}

fn read_file(path: &str, url: &str) -> Result<Vec<u8>, FetchError> {
    let path = Path::new(path);
    match std::fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(FetchError::NotFound(url.to_string()))
        }
        Err(err) => Err(FetchError::Io(err)),
    }
}
