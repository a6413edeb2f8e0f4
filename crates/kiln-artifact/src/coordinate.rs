//! Coordinate values.

use crate::CoordinateError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The type used when a coordinate does not name one.
pub const DEFAULT_TYPE: &str = "jar";

const ATTRIBUTES: [&str; 5] = ["group", "id", "type", "classifier", "version"];

/// A coordinate with its version erased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactKey {
    pub group: String,
    pub id: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
}

impl ArtifactKey {
    /// Attach a version to this key.
    pub fn with_version(&self, version: impl Into<String>) -> ArtifactCoordinate {
        ArtifactCoordinate {
            key: self.clone(),
            version: non_blank(version.into()),
        }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.id, self.artifact_type)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}

/// An immutable artifact coordinate.
///
/// The version is optional: a coordinate without one names an artifact
/// whose version has yet to be chosen. The version text is kept verbatim,
/// so it may also hold a requirement such as `>=1.0` while a spec is being
/// resolved.
///
/// Serialized as the key/value map form. Either a map or a spec string
/// deserializes, checked like [`ArtifactCoordinate::from_map`] and
/// [`ArtifactCoordinate::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CoordinateForm", into = "CoordinateForm")]
pub struct ArtifactCoordinate {
    key: ArtifactKey,
    version: Option<String>,
}

/// The serialized forms of an [`ArtifactCoordinate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateForm {
    Spec(String),
    Map(BTreeMap<String, String>),
}

impl TryFrom<CoordinateForm> for ArtifactCoordinate {
    type Error = CoordinateError;

    fn try_from(form: CoordinateForm) -> Result<Self, Self::Error> {
        match form {
            CoordinateForm::Spec(spec) => Self::parse(&spec),
            CoordinateForm::Map(map) => Self::from_map(&map),
        }
    }
}

impl From<ArtifactCoordinate> for CoordinateForm {
    fn from(coordinate: ArtifactCoordinate) -> Self {
        CoordinateForm::Map(coordinate.to_map())
    }
}

impl ArtifactCoordinate {
    /// Build a coordinate from its parts. An empty type means `jar`.
    pub fn new(
        group: impl Into<String>,
        id: impl Into<String>,
        artifact_type: impl Into<String>,
        classifier: Option<String>,
        version: Option<String>,
    ) -> Result<Self, CoordinateError> {
        let group = group.into();
        let id = id.into();
        let artifact_type = artifact_type.into();
        let display = format!("{group}:{id}:{artifact_type}");
        if group.trim().is_empty() {
            return Err(CoordinateError::MissingGroup(display));
        }
        if id.trim().is_empty() {
            return Err(CoordinateError::MissingId(display));
        }
        let artifact_type = non_blank(artifact_type).unwrap_or_else(|| DEFAULT_TYPE.to_string());
        Ok(Self {
            key: ArtifactKey {
                group,
                id,
                artifact_type,
                classifier: classifier.and_then(non_blank),
            },
            version: version.and_then(non_blank),
        })
    }

    /// Parse `group:id[:type[:classifier]:version]`.
    ///
    /// With four segments the last one is the version; with five the
    /// fourth is the classifier. A version of `-` means "no version".
    pub fn parse(spec: &str) -> Result<Self, CoordinateError> {
        let spec = spec.trim();
        let parts: Vec<&str> = spec.split(':').collect();
        let (group, id, artifact_type, classifier, version) = match parts.as_slice() {
            [group, id] => (*group, *id, "", None, None),
            [group, id, ty] => (*group, *id, *ty, None, None),
            [group, id, ty, version] => (*group, *id, *ty, None, Some(*version)),
            [group, id, ty, classifier, version] => {
                (*group, *id, *ty, Some(*classifier), Some(*version))
            }
            _ => return Err(CoordinateError::Malformed(spec.to_string())),
        };
        let version = version.filter(|v| *v != "-").map(str::to_string);
        Self::new(
            group,
            id,
            artifact_type,
            classifier.map(str::to_string),
            version,
        )
        .map_err(|err| match err {
            CoordinateError::MissingGroup(_) => CoordinateError::MissingGroup(spec.to_string()),
            CoordinateError::MissingId(_) => CoordinateError::MissingId(spec.to_string()),
            other => other,
        })
    }

    /// Build a coordinate from a key/value map using the attribute names
    /// `group`, `id`, `type`, `classifier` and `version`.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, CoordinateError> {
        if let Some(unknown) = map.keys().find(|k| !ATTRIBUTES.contains(&k.as_str())) {
            return Err(CoordinateError::UnknownAttribute(unknown.clone()));
        }
        let get = |name: &str| map.get(name).cloned().unwrap_or_default();
        Self::new(
            get("group"),
            get("id"),
            get("type"),
            map.get("classifier").cloned(),
            map.get("version").cloned(),
        )
    }

    /// The key/value form. The classifier and version are omitted when unset.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("group".to_string(), self.key.group.clone());
        map.insert("id".to_string(), self.key.id.clone());
        map.insert("type".to_string(), self.key.artifact_type.clone());
        if let Some(classifier) = &self.key.classifier {
            map.insert("classifier".to_string(), classifier.clone());
        }
        if let Some(version) = &self.version {
            map.insert("version".to_string(), version.clone());
        }
        map
    }

    /// Does `text` look like a coordinate rather than a logical name?
    /// Anything with at least two colons does.
    pub fn looks_like_spec(text: &str) -> bool {
        text.matches(':').count() >= 2
    }

    pub fn group(&self) -> &str {
        &self.key.group
    }

    pub fn id(&self) -> &str {
        &self.key.id
    }

    pub fn artifact_type(&self) -> &str {
        &self.key.artifact_type
    }

    pub fn classifier(&self) -> Option<&str> {
        self.key.classifier.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn key(&self) -> &ArtifactKey {
        &self.key
    }

    /// The canonical unversioned form, e.g. `org.x:lib:jar`.
    pub fn unversioned_identity(&self) -> String {
        self.key.to_string()
    }

    /// A copy of this coordinate with the version replaced.
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        self.key.with_version(version)
    }

    /// A copy of this coordinate without a version.
    pub fn without_version(&self) -> Self {
        Self {
            key: self.key.clone(),
            version: None,
        }
    }

    pub fn is_snapshot(&self) -> bool {
        self.version
            .as_deref()
            .is_some_and(|v| v.ends_with("-SNAPSHOT"))
    }

    /// The colon-delimited spec string.
    pub fn to_spec(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)?;
        if let Some(version) = &self.version {
            write!(f, ":{version}")?;
        }
        Ok(())
    }
}

impl FromStr for ArtifactCoordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}
