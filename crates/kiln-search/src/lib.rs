//! Version search for Kiln.
//!
//! Given an artifact spec whose version is a requirement such as `~>1.0`,
//! [`VersionSearch`] asks an ordered list of [`VersionProbe`]s for candidate
//! versions and returns the spec pinned to the first candidate that
//! satisfies the requirement. Probes are tried in order: artifacts known
//! to the running build, the local repository, each remote repository, and
//! finally a package search site. A [`SearchFilter`] can switch individual
//! probes off.
//!
//! When no probe produces a match the requirement's own default version is
//! used, and only when there is none does the search fail.

mod filter;
mod probe;
mod search;

pub use filter::{ProbeSelector, SearchFilter};
pub use probe::{
    LocalProbe, ProbeError, ProbeKind, RemoteProbe, RuntimeProbe, VersionProbe, WebProbe,
    DEFAULT_WEB_SEARCH,
};
pub use search::VersionSearch;

use kiln_artifact::CoordinateError;
use kiln_version::ParseError;
use thiserror::Error;

/// Errors returned by [`VersionSearch`].
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(
        "could not find {spec}; you may need to pin a specific version instead of a requirement"
    )]
    Unresolved { spec: String },

    #[error(transparent)]
    Requirement(#[from] ParseError),

    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
}
