//! Which probes a search may use.

use crate::probe::{ProbeKind, VersionProbe};
use std::fmt;
use std::str::FromStr;

/// Names a set of probes: every probe, every probe of one kind, or the
/// probe for one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeSelector {
    All,
    Kind(ProbeKind),
    Source(String),
}

impl ProbeSelector {
    pub fn matches(&self, kind: ProbeKind, source: &str) -> bool {
        match self {
            ProbeSelector::All => true,
            ProbeSelector::Kind(k) => *k == kind,
            ProbeSelector::Source(s) => s.trim_end_matches('/') == source.trim_end_matches('/'),
        }
    }
}

impl FromStr for ProbeSelector {
    type Err = std::convert::Infallible;

    /// `all`, a probe kind, or anything else as a source.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(ProbeSelector::All);
        }
        Ok(match s.parse::<ProbeKind>() {
            Ok(kind) => ProbeSelector::Kind(kind),
            Err(_) => ProbeSelector::Source(s.to_string()),
        })
    }
}

impl From<ProbeKind> for ProbeSelector {
    fn from(kind: ProbeKind) -> Self {
        ProbeSelector::Kind(kind)
    }
}

impl fmt::Display for ProbeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeSelector::All => f.write_str("all"),
            ProbeSelector::Kind(kind) => write!(f, "{kind}"),
            ProbeSelector::Source(source) => f.write_str(source),
        }
    }
}

/// The allow and deny lists applied to every probe.
///
/// A probe runs when search is enabled, the include list is empty or
/// selects it, and the exclude list does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pub enabled: bool,
    include: Vec<ProbeSelector>,
    exclude: Vec<ProbeSelector>,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            enabled: true,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(&mut self, selector: impl Into<ProbeSelector>) -> &mut Self {
        self.include.push(selector.into());
        self
    }

    pub fn exclude(&mut self, selector: impl Into<ProbeSelector>) -> &mut Self {
        self.exclude.push(selector.into());
        self
    }

    pub fn includes(&self) -> &[ProbeSelector] {
        &self.include
    }

    pub fn excludes(&self) -> &[ProbeSelector] {
        &self.exclude
    }

    pub fn allows_kind(&self, kind: ProbeKind, source: &str) -> bool {
        self.enabled
            && (self.include.is_empty() || self.include.iter().any(|s| s.matches(kind, source)))
            && !self.exclude.iter().any(|s| s.matches(kind, source))
    }

    pub fn allows(&self, probe: &dyn VersionProbe) -> bool {
        self.allows_kind(probe.kind(), &probe.source())
    }
}
