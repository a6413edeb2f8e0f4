//! Checks run before a selection is committed.

use crate::NamespaceError;
use crate::entry::RequiredArtifact;
use kiln_artifact::ArtifactCoordinate;

/// Rejects selections that break a declared requirement.
pub struct SelectionGuard;

impl SelectionGuard {
    /// Check `selected` against `required`.
    ///
    /// The version must satisfy the requirement, and group, id, type and
    /// classifier must all match. Missing either side passes.
    pub fn enforce(
        required: Option<&RequiredArtifact>,
        selected: Option<&ArtifactCoordinate>,
    ) -> Result<(), NamespaceError> {
        let (Some(required), Some(selected)) = (required, selected) else {
            return Ok(());
        };

        if !required.satisfied_by(selected.version()) {
            return Err(NamespaceError::UnsatisfiedRequirement {
                required: required.to_string(),
                version: selected.version().unwrap_or_default().to_string(),
            });
        }

        if required.key() != selected.key() {
            return Err(NamespaceError::AttributeMismatch {
                required: required.to_string(),
                got: selected.to_spec(),
            });
        }

        Ok(())
    }

    /// Check `selected` against every requirement, nearest first.
    pub fn enforce_all<'a>(
        requirements: impl IntoIterator<Item = &'a RequiredArtifact>,
        selected: &ArtifactCoordinate,
    ) -> Result<(), NamespaceError> {
        requirements
            .into_iter()
            .try_for_each(|required| Self::enforce(Some(required), Some(selected)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::parse_need;

    fn required(text: &str) -> RequiredArtifact {
        parse_need(text).unwrap().1
    }

    fn coord(spec: &str) -> ArtifactCoordinate {
        ArtifactCoordinate::parse(spec).unwrap()
    }

    #[test]
    fn test_accepts_satisfying_version() {
        let req = required("a:b:c:~>2.0");
        assert!(SelectionGuard::enforce(Some(&req), Some(&coord("a:b:c:2.5"))).is_ok());
    }

    #[test]
    fn test_rejects_version() {
        let req = required("a:b:c:~>2.0");
        let err = SelectionGuard::enforce(Some(&req), Some(&coord("a:b:c:3.0"))).unwrap_err();
        assert!(matches!(err, NamespaceError::UnsatisfiedRequirement { .. }));
        assert!(err.to_string().contains("a:b:c:~>2.0"));
    }

    #[test]
    fn test_rejects_attributes() {
        let req = required("a:b:c:~>2.0");
        let err = SelectionGuard::enforce(Some(&req), Some(&coord("a:b:zip:2.0"))).unwrap_err();
        assert!(matches!(err, NamespaceError::AttributeMismatch { .. }));
    }

    #[test]
    fn test_missing_side_passes() {
        let req = required("a:b:c:1");
        assert!(SelectionGuard::enforce(Some(&req), None).is_ok());
        assert!(SelectionGuard::enforce(None, Some(&coord("a:b:c:9"))).is_ok());
    }

    #[test]
    fn test_enforce_all() {
        let chain = [required("a:b:c:>=1.0"), required("a:b:c:<2.0")];
        assert!(SelectionGuard::enforce_all(&chain, &coord("a:b:c:1.5")).is_ok());
        assert!(SelectionGuard::enforce_all(&chain, &coord("a:b:c:2.5")).is_err());
    }
}
