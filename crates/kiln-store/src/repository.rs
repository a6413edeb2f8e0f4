//! Local repository operations.

use crate::path::local_repository_dir;
use kiln_artifact::{ArtifactCoordinate, artifact_file_name, repository_path, version_dir};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::trace;

/// Errors that can occur while reading the local repository.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0} has no version")]
    Unversioned(String),
}

/// A read-only view of a local repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    /// Open the repository at the default location.
    pub fn open() -> Self {
        Self::at(local_repository_dir())
    }

    /// Open the repository rooted at `root`. The directory need not exist.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the repository root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The names of the subdirectories of `group/path/id/`, in descending
    /// string order. This is not version order: `9.0` lists before `10.0`.
    ///
    /// A missing artifact directory yields an empty list.
    pub fn list_versions(&self, group: &str, id: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.root.join(version_dir(group, id));
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                trace!(dir = %dir.display(), "no local versions");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                versions.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        versions.sort();
        versions.reverse();
        Ok(versions)
    }

    /// The handle of a versioned artifact, with one download URL per
    /// remote repository.
    pub fn handle(
        &self,
        coordinate: &ArtifactCoordinate,
        remotes: &[String],
    ) -> Result<ArtifactHandle, StoreError> {
        let Some(version) = coordinate.version() else {
            return Err(StoreError::Unversioned(coordinate.to_spec()));
        };
        let path = self
            .root
            .join(version_dir(coordinate.group(), coordinate.id()))
            .join(version)
            .join(artifact_file_name(coordinate));
        let relative = repository_path(coordinate);
        let remote_urls = remotes
            .iter()
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), relative))
            .collect();
        Ok(ArtifactHandle {
            coordinate: coordinate.clone(),
            path,
            remote_urls,
        })
    }
}

/// A resolved artifact: where it lives locally and where it can be
/// downloaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactHandle {
    pub coordinate: ArtifactCoordinate,
    pub path: PathBuf,
    pub remote_urls: Vec<String>,
}

impl ArtifactHandle {
    /// Whether the file is already present in the local repository.
    pub fn is_cached(&self) -> bool {
        self.path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo_with(versions: &[&str]) -> (TempDir, LocalRepository) {
        let dir = TempDir::new().unwrap();
        for version in versions {
            fs::create_dir_all(dir.path().join("org/x/lib").join(version)).unwrap();
        }
        let repo = LocalRepository::at(dir.path());
        (dir, repo)
    }

    #[test]
    fn test_list_versions_descending() {
        let (_dir, repo) = repo_with(&["1.0", "1.2", "1.1"]);
        assert_eq!(repo.list_versions("org.x", "lib").unwrap(), vec!["1.2", "1.1", "1.0"]);
    }

    #[test]
    fn test_list_versions_is_lexicographic() {
        let (_dir, repo) = repo_with(&["9.0", "10.0"]);
        assert_eq!(repo.list_versions("org.x", "lib").unwrap(), vec!["9.0", "10.0"]);
    }

    #[test]
    fn test_list_versions_skips_files_and_missing() {
        let (dir, repo) = repo_with(&["1.0"]);
        fs::write(dir.path().join("org/x/lib/maven-metadata-local.xml"), "").unwrap();
        assert_eq!(repo.list_versions("org.x", "lib").unwrap(), vec!["1.0"]);
        assert!(repo.list_versions("org.y", "other").unwrap().is_empty());
    }

    #[test]
    fn test_handle() {
        let (dir, repo) = repo_with(&["2.3"]);
        let coordinate = ArtifactCoordinate::parse("org.x:lib:jar:2.3").unwrap();
        let handle = repo
            .handle(&coordinate, &["https://repo.example.com/maven2/".to_string()])
            .unwrap();
        assert_eq!(handle.path, dir.path().join("org/x/lib/2.3/lib-2.3.jar"));
        assert_eq!(
            handle.remote_urls,
            vec!["https://repo.example.com/maven2/org/x/lib/2.3/lib-2.3.jar"]
        );
        assert!(!handle.is_cached());
        fs::write(&handle.path, b"jar").unwrap();
        assert!(handle.is_cached());

        let unversioned = coordinate.without_version();
        assert!(matches!(
            repo.handle(&unversioned, &[]),
            Err(StoreError::Unversioned(_))
        ));
    }
}
