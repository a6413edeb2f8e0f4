//! Artifacts known to the running build.

use crate::{ArtifactCoordinate, ArtifactKey, CoordinateError};
use tracing::debug;

/// Every artifact the build has declared so far, in registration order.
#[derive(Debug, Default, Clone)]
pub struct ArtifactRegistry {
    artifacts: Vec<ArtifactCoordinate>,
}

impl ArtifactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an artifact. Registering the same spec twice is a no-op.
    /// Returns whether the artifact was new.
    pub fn register(&mut self, coordinate: ArtifactCoordinate) -> bool {
        if self.artifacts.contains(&coordinate) {
            return false;
        }
        debug!(spec = %coordinate, "registered artifact");
        self.artifacts.push(coordinate);
        true
    }

    /// Parse and register a spec string.
    pub fn register_spec(&mut self, spec: &str) -> Result<ArtifactCoordinate, CoordinateError> {
        let coordinate = ArtifactCoordinate::parse(spec)?;
        self.register(coordinate.clone());
        Ok(coordinate)
    }

    /// All registered artifacts.
    pub fn list(&self) -> &[ArtifactCoordinate] {
        &self.artifacts
    }

    /// Find a registered artifact by its spec string.
    pub fn lookup(&self, spec: &str) -> Option<&ArtifactCoordinate> {
        self.artifacts.iter().find(|a| a.to_spec() == spec)
    }

    /// Versions of every registered artifact with the same group, id and
    /// type as `key`. The classifier is not compared.
    pub fn versions_of(&self, key: &ArtifactKey) -> Vec<String> {
        self.artifacts
            .iter()
            .filter(|a| {
                a.group() == key.group && a.id() == key.id && a.artifact_type() == key.artifact_type
            })
            .filter_map(|a| a.version().map(str::to_string))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn clear(&mut self) {
        self.artifacts.clear();
    }
}
