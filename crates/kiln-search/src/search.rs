//! The search itself.

use crate::SearchError;
use crate::filter::SearchFilter;
use crate::probe::{LocalProbe, RemoteProbe, RuntimeProbe, VersionProbe, WebProbe};
use kiln_artifact::{ArtifactCoordinate, ArtifactKey, ArtifactRegistry};
use kiln_fetch::Fetch;
use kiln_store::LocalRepository;
use kiln_version::VersionRequirement;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Picks concrete versions for requirement specs.
///
/// Results are memoized per unversioned identity and requirement text for
/// the life of the search; build a new search, or call
/// [`VersionSearch::clear_memo`], to look again.
#[derive(Default)]
pub struct VersionSearch {
    probes: Vec<Box<dyn VersionProbe>>,
    filter: SearchFilter,
    memo: RefCell<HashMap<(ArtifactKey, String), Option<String>>>,
}

impl VersionSearch {
    /// A search with no probes. It can only fall back on defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// The usual probe order: `registry`, `local`, each of `remotes`, and
    /// the package search site when `web_fallback` is set.
    pub fn standard(
        registry: &ArtifactRegistry,
        local: LocalRepository,
        remotes: &[String],
        fetcher: Arc<dyn Fetch>,
        web_fallback: bool,
    ) -> Self {
        let mut search = Self::new()
            .with_probe(RuntimeProbe::new(registry))
            .with_probe(LocalProbe::new(local));
        for remote in remotes {
            search.push_probe(RemoteProbe::new(remote.as_str(), fetcher.clone()));
        }
        if web_fallback {
            search.push_probe(WebProbe::new(fetcher));
        }
        search
    }

    pub fn with_probe(mut self, probe: impl VersionProbe + 'static) -> Self {
        self.push_probe(probe);
        self
    }

    /// Adding a probe forgets memoized results.
    pub fn push_probe(&mut self, probe: impl VersionProbe + 'static) {
        self.memo.get_mut().clear();
        self.probes.push(Box::new(probe));
    }

    pub fn with_filter(mut self, filter: SearchFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn filter(&self) -> &SearchFilter {
        &self.filter
    }

    /// Changing the filter forgets memoized results.
    pub fn filter_mut(&mut self) -> &mut SearchFilter {
        self.memo.get_mut().clear();
        &mut self.filter
    }

    pub fn probes(&self) -> impl Iterator<Item = &dyn VersionProbe> {
        self.probes.iter().map(|p| p.as_ref())
    }

    pub fn clear_memo(&self) {
        self.memo.borrow_mut().clear();
    }

    /// Whether the version of `spec` is a requirement rather than a plain
    /// version, i.e. whether it needs resolving at all.
    pub fn is_requirement(spec: &ArtifactCoordinate) -> bool {
        spec.version()
            .is_some_and(VersionRequirement::is_requirement)
    }

    /// Parse `spec` and resolve it with [`VersionSearch::best_version`].
    pub fn best_version_of(&self, spec: &str) -> Result<ArtifactCoordinate, SearchError> {
        let coordinate = ArtifactCoordinate::parse(spec)?;
        self.best_version(&coordinate)
    }

    /// Pin `spec` to the best version satisfying its requirement.
    ///
    /// Probes run only when the requirement can match more than one
    /// version. The first probe to list a satisfying version wins, and
    /// within a probe the first satisfying version in its order wins. If
    /// no probe matches, the requirement's default version is used.
    ///
    /// A malformed requirement is returned as an error immediately; probe
    /// failures only mean that probe found nothing.
    pub fn best_version(
        &self,
        spec: &ArtifactCoordinate,
    ) -> Result<ArtifactCoordinate, SearchError> {
        self.best_version_or(spec, None)
    }

    /// Like [`VersionSearch::best_version`], but `fallback`, when given,
    /// replaces the requirement's own default.
    pub fn best_version_or(
        &self,
        spec: &ArtifactCoordinate,
        fallback: Option<&str>,
    ) -> Result<ArtifactCoordinate, SearchError> {
        let text = spec.version().unwrap_or_default();
        if text.trim().is_empty() {
            return Err(SearchError::Unresolved {
                spec: spec.to_spec(),
            });
        }
        let requirement = VersionRequirement::parse(text)?;

        let found = if requirement.needs_search() {
            self.search(spec.key(), text, &requirement)
        } else {
            None
        };

        let version = match found {
            Some(version) => version,
            None => match fallback
                .map(str::to_string)
                .or_else(|| requirement.default_version())
            {
                Some(default) => {
                    debug!(spec = %spec, %default, "using default version");
                    default
                }
                None => {
                    return Err(SearchError::Unresolved {
                        spec: spec.to_spec(),
                    });
                }
            },
        };

        Ok(spec.with_version(version))
    }

    fn search(
        &self,
        key: &ArtifactKey,
        text: &str,
        requirement: &VersionRequirement,
    ) -> Option<String> {
        let memo_key = (key.clone(), text.trim().to_string());
        if let Some(hit) = self.memo.borrow().get(&memo_key) {
            trace!(artifact = %key, requirement = %text, "memo hit");
            return hit.clone();
        }

        let found = self.run_probes(key, requirement);
        self.memo.borrow_mut().insert(memo_key, found.clone());
        found
    }

    fn run_probes(&self, key: &ArtifactKey, requirement: &VersionRequirement) -> Option<String> {
        for probe in &self.probes {
            let kind = probe.kind();
            let source = probe.source();
            if !self.filter.allows(probe.as_ref()) {
                trace!(probe = %kind, %source, "probe skipped");
                continue;
            }

            let versions = match probe.versions(key) {
                Ok(versions) => versions,
                Err(err) => {
                    warn!(probe = %kind, %source, artifact = %key, error = %err, "probe failed");
                    continue;
                }
            };
            debug!(probe = %kind, %source, artifact = %key, candidates = versions.len(), "probed");

            if let Some(version) = versions.into_iter().find(|v| requirement.satisfied_by(v)) {
                debug!(probe = %kind, artifact = %key, %version, "selected");
                return Some(version);
            }
        }
        None
    }
}

impl std::fmt::Debug for VersionSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionSearch")
            .field(
                "probes",
                &self.probes.iter().map(|p| p.source()).collect::<Vec<_>>(),
            )
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}
