//! The values stored in and read from a namespace.

use crate::NamespaceError;
use crate::registry::NamespaceId;
use kiln_artifact::{ArtifactCoordinate, ArtifactKey};
use kiln_version::{Version, VersionRequirement};
use std::fmt;

/// A requirement registered with `need`: an artifact, the versions it
/// may take, and the version to prefer when nothing else decides.
#[derive(Debug, Clone, PartialEq)]
pub struct RequiredArtifact {
    key: ArtifactKey,
    requirement: VersionRequirement,
    text: String,
    default: Option<String>,
}

impl RequiredArtifact {
    /// Build from a coordinate whose version field is a requirement, and
    /// an optional separate requirement.
    ///
    /// With a separate requirement the coordinate's own version, when it
    /// is a plain version, becomes the preferred default; `a:b:c:2.1` with
    /// `~>2.0` prefers `2.1`. Otherwise the requirement's default is used.
    pub fn new(
        coordinate: &ArtifactCoordinate,
        requirement: Option<&str>,
    ) -> Result<Self, NamespaceError> {
        let version = coordinate.version();
        let text = match (requirement, version) {
            (Some(text), _) => text.trim(),
            (None, Some(version)) => version.trim(),
            (None, None) => return Err(NamespaceError::MissingVersion(coordinate.to_spec())),
        };
        let parsed = VersionRequirement::parse(text)?;
        let preferred = match (requirement, version) {
            (Some(_), Some(v)) if VersionRequirement::is_version(v) => Some(v.trim().to_string()),
            _ => None,
        };
        let default = preferred.or_else(|| parsed.default_version());
        Ok(Self {
            key: coordinate.key().clone(),
            requirement: parsed,
            text: text.to_string(),
            default,
        })
    }

    pub fn key(&self) -> &ArtifactKey {
        &self.key
    }

    pub fn requirement(&self) -> &VersionRequirement {
        &self.requirement
    }

    /// The requirement as written.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn default_version(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// The coordinate carrying the requirement text as its version, the
    /// form version search takes.
    pub fn search_spec(&self) -> ArtifactCoordinate {
        self.key.with_version(self.text.clone())
    }

    /// The coordinate at the default version, or unversioned.
    pub fn default_coordinate(&self) -> ArtifactCoordinate {
        self.key.with_version(self.default.clone().unwrap_or_default())
    }

    pub fn satisfied_by(&self, version: Option<&str>) -> bool {
        version.is_some_and(|v| self.requirement.satisfied_by(v))
    }
}

impl fmt::Display for RequiredArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.text)
    }
}

/// Split a `need` string into an optional name and its requirement.
///
/// Accepted forms:
///
/// ```text
/// group:id:type:requirement
/// group:id:type:version -> requirement
/// name -> group:id:type:requirement
/// name -> group:id:type:version -> requirement
/// ```
pub(crate) fn parse_need(text: &str) -> Result<(Option<String>, RequiredArtifact), NamespaceError> {
    let parts: Vec<&str> = text.split("->").map(str::trim).collect();
    let (name, spec, requirement) = match parts.as_slice() {
        [spec] => (None, *spec, None),
        [spec, requirement] if ArtifactCoordinate::looks_like_spec(spec) => {
            (None, *spec, Some(*requirement))
        }
        [name, spec] => (Some(*name), *spec, None),
        [name, spec, requirement] => (Some(*name), *spec, Some(*requirement)),
        _ => {
            return Err(NamespaceError::Coordinate(
                kiln_artifact::CoordinateError::Malformed(text.to_string()),
            ));
        }
    };
    let coordinate = ArtifactCoordinate::parse(spec)?;
    let required = RequiredArtifact::new(&coordinate, requirement)?;
    Ok((name.map(str::to_string), required))
}

/// A value assigned to a name with `use`.
#[derive(Debug, Clone, PartialEq)]
pub enum UseValue {
    /// A bare version. The rest of the coordinate comes from whatever the
    /// name already refers to.
    Version(String),
    /// A coordinate spec string.
    Spec(String),
    /// An artifact taken from elsewhere, stored as an independent copy.
    Copied(ArtifactCoordinate),
    /// Another name, resolved through this namespace and its parents.
    Reference(String),
    /// A nested namespace.
    Namespace(NamespaceId),
}

impl From<&str> for UseValue {
    /// Versions such as `1.0` become [`UseValue::Version`], anything with
    /// two or more colons a [`UseValue::Spec`], and everything else a
    /// [`UseValue::Reference`] to another name.
    fn from(value: &str) -> Self {
        let value = value.trim();
        if VersionRequirement::is_version(value) {
            UseValue::Version(value.to_string())
        } else if ArtifactCoordinate::looks_like_spec(value) {
            UseValue::Spec(value.to_string())
        } else {
            UseValue::Reference(value.to_string())
        }
    }
}

impl From<String> for UseValue {
    fn from(value: String) -> Self {
        UseValue::from(value.as_str())
    }
}

impl From<ArtifactCoordinate> for UseValue {
    fn from(value: ArtifactCoordinate) -> Self {
        UseValue::Copied(value)
    }
}

impl From<&ArtifactCoordinate> for UseValue {
    fn from(value: &ArtifactCoordinate) -> Self {
        UseValue::Copied(value.clone())
    }
}

impl From<&ArtifactRequirement> for UseValue {
    fn from(value: &ArtifactRequirement) -> Self {
        UseValue::Copied(value.coordinate.clone())
    }
}

impl From<NamespaceId> for UseValue {
    fn from(value: NamespaceId) -> Self {
        UseValue::Namespace(value)
    }
}

/// What a namespace knows about one name: the coordinate in use, the
/// requirement on it, and whether a version has been selected.
///
/// This is a snapshot; changing the namespace afterwards does not change
/// it.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactRequirement {
    pub(crate) name: Option<String>,
    pub(crate) coordinate: ArtifactCoordinate,
    pub(crate) required: Option<RequiredArtifact>,
    pub(crate) selected: bool,
}

impl ArtifactRequirement {
    pub(crate) fn selected(
        name: Option<String>,
        coordinate: ArtifactCoordinate,
        required: Option<RequiredArtifact>,
    ) -> Self {
        Self {
            name,
            coordinate,
            required,
            selected: true,
        }
    }

    pub(crate) fn unselected(name: Option<String>, required: RequiredArtifact) -> Self {
        Self {
            name,
            coordinate: required.default_coordinate(),
            required: Some(required),
            selected: false,
        }
    }

    /// The logical name this entry was looked up or listed under.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The selected coordinate, or the default one when nothing is
    /// selected.
    pub fn coordinate(&self) -> &ArtifactCoordinate {
        &self.coordinate
    }

    /// The selected or default version.
    pub fn version(&self) -> Option<&str> {
        self.coordinate.version()
    }

    pub fn requirement(&self) -> Option<&VersionRequirement> {
        self.required.as_ref().map(RequiredArtifact::requirement)
    }

    pub fn required(&self) -> Option<&RequiredArtifact> {
        self.required.as_ref()
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn to_spec(&self) -> String {
        self.coordinate.to_spec()
    }

    pub fn unversioned_spec(&self) -> String {
        self.coordinate.unversioned_identity()
    }

    /// Whether `candidate`, a version or a full spec, would be acceptable.
    ///
    /// A spec must name the same group, id, type and classifier. Without a
    /// requirement the version must equal the current one.
    pub fn is_satisfied_by(&self, candidate: &str) -> bool {
        let version = if VersionRequirement::is_version(candidate) {
            candidate.trim().to_string()
        } else {
            match ArtifactCoordinate::parse(candidate) {
                Ok(spec) if spec.key() == self.coordinate.key() => match spec.version() {
                    Some(v) => v.to_string(),
                    None => return false,
                },
                _ => return false,
            }
        };
        match &self.required {
            Some(required) => required.requirement().satisfied_by(&version),
            None => match (self.version().and_then(Version::parse), Version::parse(&version)) {
                (Some(current), Some(candidate)) => current == candidate,
                _ => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_need_forms() {
        let (name, required) = parse_need("a:b:c:1").unwrap();
        assert_eq!(name, None);
        assert_eq!(required.default_version(), Some("1"));

        let (name, required) = parse_need("thing -> a:b:c:2.1 -> ~>2.0").unwrap();
        assert_eq!(name.as_deref(), Some("thing"));
        assert_eq!(required.text(), "~>2.0");
        assert_eq!(required.default_version(), Some("2.1"));
        assert_eq!(required.to_string(), "a:b:c:~>2.0");

        let (name, required) = parse_need("a:b:c:2.1 -> ~>2.0").unwrap();
        assert_eq!(name, None);
        assert_eq!(required.default_version(), Some("2.1"));

        let (name, required) = parse_need("thing -> a:b:c:(~>2.0 | 2.1)").unwrap();
        assert_eq!(name.as_deref(), Some("thing"));
        assert_eq!(required.default_version(), Some("2.1"));
    }

    #[test]
    fn test_parse_need_errors() {
        assert!(matches!(
            parse_need("a:b:c"),
            Err(NamespaceError::MissingVersion(_))
        ));
        assert!(matches!(
            parse_need("a:b:c:>=1 $"),
            Err(NamespaceError::Requirement(_))
        ));
        assert!(parse_need("a -> b -> c -> d").is_err());
    }

    #[test]
    fn test_use_value_classification() {
        assert_eq!(UseValue::from("2.0"), UseValue::Version("2.0".into()));
        assert_eq!(UseValue::from("a:b:c:1"), UseValue::Spec("a:b:c:1".into()));
        assert_eq!(UseValue::from("copied"), UseValue::Reference("copied".into()));
    }

    #[test]
    fn test_satisfied_by() {
        let (_, required) = parse_need("a:b:c:1").unwrap();
        let entry = ArtifactRequirement::unselected(Some("b".into()), required);
        assert!(entry.is_satisfied_by("a:b:c:1"));
        assert!(!entry.is_satisfied_by("a:b:c:2"));
        assert!(!entry.is_satisfied_by("d:b:c:1"));
        assert!(entry.is_satisfied_by("1.0"));
        assert!(!entry.is_selected());
        assert_eq!(entry.version(), Some("1"));
    }
}
