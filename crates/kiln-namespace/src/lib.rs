//! Artifact namespaces for Kiln.
//!
//! A namespace maps logical names such as `lib` to artifacts. Each name is
//! either *required* (a coordinate plus a version requirement, registered
//! with [`NamespaceMut::need`]) or *selected* (a concrete coordinate, set
//! with [`NamespaceMut::select`]), or holds a nested namespace.
//!
//! Namespaces form a tree. Lookups fall back on the parent, and a
//! selection is only accepted when it satisfies the requirement every
//! ancestor declared for the same artifact:
//!
//! ```
//! use kiln_namespace::NamespaceRegistry;
//!
//! let mut registry = NamespaceRegistry::new();
//! let parent = registry.instance("app");
//! let child = registry.instance("app:web");
//!
//! registry.namespace_mut(parent).need_named("lib", "org.x:lib:jar:~>2.0")?;
//! registry.namespace_mut(child).select("lib", "2.3")?;
//! assert_eq!(registry.namespace(child).spec("lib").unwrap().to_spec(), "org.x:lib:jar:2.3");
//!
//! assert!(registry.namespace_mut(child).select("lib", "3.0").is_err());
//! # Ok::<(), kiln_namespace::NamespaceError>(())
//! ```

mod entry;
mod guard;
mod namespace;
mod registry;

pub use entry::{ArtifactRequirement, RequiredArtifact, UseValue};
pub use guard::SelectionGuard;
pub use namespace::{Namespace, NamespaceMut};
pub use registry::{NamespaceId, NamespaceRegistry, ROOT};

use kiln_artifact::CoordinateError;
use kiln_search::SearchError;
use kiln_version::ParseError;
use thiserror::Error;

/// Errors raised by namespace operations.
#[derive(Debug, Error)]
pub enum NamespaceError {
    #[error("unsatisfied version requirement {required}: not met by {version:?}")]
    UnsatisfiedRequirement { required: String, version: String },

    #[error("artifact attributes mismatch: required {required}, got {got}")]
    AttributeMismatch { required: String, got: String },

    #[error("{0} is not a sub-namespace")]
    NotASubNamespace(String),

    #[error("undefined artifact name {0:?}")]
    UndefinedName(String),

    #[error("cannot set parent of root namespace")]
    RootParent,

    #[error("setting the parent of {0} would create a cycle")]
    ParentCycle(String),

    #[error("{0} has no version")]
    MissingVersion(String),

    #[error(transparent)]
    Coordinate(#[from] CoordinateError),

    #[error(transparent)]
    Requirement(#[from] ParseError),

    #[error(transparent)]
    Search(#[from] SearchError),
}
