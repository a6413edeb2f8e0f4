//! Repository layout.
//!
//! Artifacts live at `group/path/id/version/id-version[-classifier].type`,
//! with the dots of the group turned into directories.

use crate::ArtifactCoordinate;
use std::path::PathBuf;

/// `org.apache.ant` becomes `org/apache/ant`.
pub fn group_path(group: &str) -> String {
    group.replace('.', "/")
}

/// The directory holding every version of an artifact, relative to a
/// repository root.
pub fn version_dir(group: &str, id: &str) -> PathBuf {
    let mut path = PathBuf::new();
    for part in group.split('.').filter(|p| !p.is_empty()) {
        path.push(part);
    }
    path.push(id);
    path
}

/// The file name of a versioned artifact.
pub fn artifact_file_name(coordinate: &ArtifactCoordinate) -> String {
    let mut name = coordinate.id().to_string();
    if let Some(version) = coordinate.version() {
        name.push('-');
        name.push_str(version);
    }
    if let Some(classifier) = coordinate.classifier() {
        name.push('-');
        name.push_str(classifier);
    }
    name.push('.');
    name.push_str(coordinate.artifact_type());
    name
}

/// The URL-style path of an artifact inside a repository, always joined
/// with `/`.
pub fn repository_path(coordinate: &ArtifactCoordinate) -> String {
    let mut path = format!("{}/{}", group_path(coordinate.group()), coordinate.id());
    if let Some(version) = coordinate.version() {
        path.push('/');
        path.push_str(version);
    }
    path.push('/');
    path.push_str(&artifact_file_name(coordinate));
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_path() {
        assert_eq!(group_path("org.apache.ant"), "org/apache/ant");
        assert_eq!(
            version_dir("org.apache.ant", "ant"),
            PathBuf::from("org").join("apache").join("ant").join("ant")
        );
    }

    #[test]
    fn test_repository_path() {
        let c = ArtifactCoordinate::parse("org.x:lib:jar:sources:2.3").unwrap();
        assert_eq!(artifact_file_name(&c), "lib-2.3-sources.jar");
        assert_eq!(repository_path(&c), "org/x/lib/2.3/lib-2.3-sources.jar");
    }
}
