//! Sources of candidate versions.

use kiln_artifact::{ArtifactCoordinate, ArtifactKey, ArtifactRegistry, group_path};
use kiln_fetch::url::is_http;
use kiln_fetch::{Fetch, FetchError, parse_listing, parse_metadata, parse_search_table};
use kiln_store::{LocalRepository, StoreError};
use kiln_version::Version;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// The package search site probed last.
pub const DEFAULT_WEB_SEARCH: &str = "https://mvnrepository.com/artifact";

/// The kinds of probe, in the order a search tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProbeKind {
    Runtime,
    Local,
    Remote,
    Web,
}

impl ProbeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProbeKind::Runtime => "runtime",
            ProbeKind::Local => "local",
            ProbeKind::Remote => "remote",
            ProbeKind::Web => "web",
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProbeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "runtime" => Ok(ProbeKind::Runtime),
            "local" => Ok(ProbeKind::Local),
            "remote" => Ok(ProbeKind::Remote),
            "web" | "mvnrepository" => Ok(ProbeKind::Web),
            other => Err(format!("unknown probe kind: {other}")),
        }
    }
}

/// A probe failure. Searches log these and move on to the next probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One place to look for the versions of an artifact.
pub trait VersionProbe {
    fn kind(&self) -> ProbeKind;

    /// Where this probe looks: a URL, a directory, or `runtime`.
    fn source(&self) -> String;

    /// Candidate versions of `key`, most preferred first.
    fn versions(&self, key: &ArtifactKey) -> Result<Vec<String>, ProbeError>;
}

/// Artifacts already declared in the running build.
///
/// Holds a snapshot of the registry taken when the probe is built.
#[derive(Debug, Clone, Default)]
pub struct RuntimeProbe {
    registry: ArtifactRegistry,
}

impl RuntimeProbe {
    pub fn new(registry: &ArtifactRegistry) -> Self {
        Self {
            registry: registry.clone(),
        }
    }

    pub fn from_specs<'a>(specs: impl IntoIterator<Item = &'a ArtifactCoordinate>) -> Self {
        let mut registry = ArtifactRegistry::new();
        for spec in specs {
            registry.register(spec.clone());
        }
        Self { registry }
    }
}

impl VersionProbe for RuntimeProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Runtime
    }

    fn source(&self) -> String {
        ProbeKind::Runtime.to_string()
    }

    /// Newest first; versions that do not parse go last.
    fn versions(&self, key: &ArtifactKey) -> Result<Vec<String>, ProbeError> {
        let mut versions = self.registry.versions_of(key);
        versions.sort_by(|a, b| match (Version::parse(a), Version::parse(b)) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        Ok(versions)
    }
}

/// Version directories in the local repository.
#[derive(Debug, Clone)]
pub struct LocalProbe {
    repository: LocalRepository,
}

impl LocalProbe {
    pub fn new(repository: LocalRepository) -> Self {
        Self { repository }
    }
}

impl VersionProbe for LocalProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Local
    }

    fn source(&self) -> String {
        self.repository.root().display().to_string()
    }

    fn versions(&self, key: &ArtifactKey) -> Result<Vec<String>, ProbeError> {
        Ok(self.repository.list_versions(&key.group, &key.id)?)
    }
}

/// A remote repository: its `maven-metadata.xml`, or failing that its
/// directory listing.
pub struct RemoteProbe {
    base: String,
    fetcher: Arc<dyn Fetch>,
    listing_fallback: bool,
}

impl RemoteProbe {
    pub fn new(base: impl Into<String>, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            fetcher,
            listing_fallback: true,
        }
    }

    /// Whether a missing metadata document falls back to the directory
    /// listing. Only `http(s)` repositories are ever listed.
    pub fn listing_fallback(mut self, enabled: bool) -> Self {
        self.listing_fallback = enabled;
        self
    }

    fn artifact_url(&self, key: &ArtifactKey) -> String {
        format!("{}/{}/{}", self.base, group_path(&key.group), key.id)
    }
}

impl fmt::Debug for RemoteProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteProbe")
            .field("base", &self.base)
            .field("listing_fallback", &self.listing_fallback)
            .finish_non_exhaustive()
    }
}

impl VersionProbe for RemoteProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Remote
    }

    fn source(&self) -> String {
        self.base.clone()
    }

    fn versions(&self, key: &ArtifactKey) -> Result<Vec<String>, ProbeError> {
        let artifact_url = self.artifact_url(key);
        let metadata_url = format!("{artifact_url}/maven-metadata.xml");

        match self.fetcher.fetch_text(&metadata_url) {
            Ok(xml) => return Ok(parse_metadata(&xml)?),
            Err(err) if err.is_not_found() => {
                debug!(url = %metadata_url, "no metadata");
            }
            Err(err) => return Err(err.into()),
        }

        if !(self.listing_fallback && is_http(&self.base)) {
            return Ok(Vec::new());
        }

        let listing_url = format!("{artifact_url}/");
        match self.fetcher.fetch_text(&listing_url) {
            Ok(html) => Ok(parse_listing(&html)),
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }
}

/// A package search site, scraped as a last resort.
pub struct WebProbe {
    base: String,
    fetcher: Arc<dyn Fetch>,
}

impl WebProbe {
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self::with_base(DEFAULT_WEB_SEARCH, fetcher)
    }

    pub fn with_base(base: impl Into<String>, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            fetcher,
        }
    }
}

impl fmt::Debug for WebProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebProbe")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl VersionProbe for WebProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Web
    }

    fn source(&self) -> String {
        self.base.clone()
    }

    fn versions(&self, key: &ArtifactKey) -> Result<Vec<String>, ProbeError> {
        let url = format!("{}/{}/{}", self.base, key.group, key.id);
        match self.fetcher.fetch_text(&url) {
            Ok(html) => Ok(parse_search_table(&html)),
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }
}
