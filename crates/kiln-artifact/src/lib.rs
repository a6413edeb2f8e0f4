//! Artifact coordinates for Kiln.
//!
//! An artifact is identified by a colon-delimited coordinate:
//!
//! ```text
//! group:id:type:version
//! group:id:type:classifier:version
//! ```
//!
//! The coordinate with its version erased, the [`ArtifactKey`], is what
//! namespaces and the registry use to recognise "the same artifact at a
//! different version".

mod coordinate;
mod layout;
mod registry;

pub use coordinate::{ArtifactCoordinate, ArtifactKey, CoordinateForm, DEFAULT_TYPE};
pub use layout::{artifact_file_name, group_path, repository_path, version_dir};
pub use registry::ArtifactRegistry;

use thiserror::Error;

/// Errors raised while building a coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    #[error("missing group identifier in {0:?}")]
    MissingGroup(String),

    #[error("missing artifact identifier in {0:?}")]
    MissingId(String),

    #[error("expecting <group:id:type:version> or <group:id:type:classifier:version>, found {0:?}")]
    Malformed(String),

    #[error("unknown coordinate attribute {0:?}")]
    UnknownAttribute(String),
}
