//! The requirement expression tree.

use crate::lexer::{Lexer, is_version_char};
use crate::parser::{ParseError, Parser};
use crate::version::Version;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

/// A version comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// `~>`, at least this version but below its next significant bump.
    Compatible,
}

impl Comparator {
    /// Compare `candidate` against `required`.
    pub fn matches(self, candidate: &Version, required: &Version) -> bool {
        match self {
            Comparator::Eq => candidate == required,
            Comparator::Ne => candidate != required,
            Comparator::Gt => candidate > required,
            Comparator::Lt => candidate < required,
            Comparator::Ge => candidate >= required,
            Comparator::Le => candidate <= required,
            Comparator::Compatible => {
                candidate >= required && candidate.release() < required.bump()
            }
        }
    }

    /// Whether a leaf with this comparator can name its own version as the
    /// default pick.
    fn admits_own_version(self) -> bool {
        matches!(
            self,
            Comparator::Eq | Comparator::Ge | Comparator::Le | Comparator::Compatible
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Comparator::Eq => "=",
            Comparator::Ne => "!=",
            Comparator::Gt => ">",
            Comparator::Lt => "<",
            Comparator::Ge => ">=",
            Comparator::Le => "<=",
            Comparator::Compatible => "~>",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The shape of a requirement node.
#[derive(Debug, Clone, PartialEq)]
pub enum RequirementNode {
    /// A single comparison. A missing comparator means `=`.
    Leaf {
        comparator: Option<Comparator>,
        version: Version,
    },
    /// All children must hold.
    All(Vec<VersionRequirement>),
    /// At least one child must hold.
    Any(Vec<VersionRequirement>),
}

/// A boolean expression over version comparisons.
///
/// Every node carries a `negative` flag that inverts its result, so
/// `!(1 | 2)` is an [`RequirementNode::Any`] with `negative` set.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionRequirement {
    negative: bool,
    node: RequirementNode,
}

impl VersionRequirement {
    /// Parse a requirement expression.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let tokens = Lexer::new(source).tokenize()?;
        Parser::new(source, tokens).parse()
    }

    /// A leaf requirement.
    pub fn leaf(comparator: Option<Comparator>, version: Version) -> Self {
        Self {
            negative: false,
            node: RequirementNode::Leaf {
                comparator,
                version,
            },
        }
    }

    /// An exact requirement on `version`, or `None` when it is blank.
    pub fn exact(version: &str) -> Option<Self> {
        Version::parse(version).map(|v| Self::leaf(None, v))
    }

    pub fn all(children: Vec<VersionRequirement>) -> Self {
        Self {
            negative: false,
            node: RequirementNode::All(children),
        }
    }

    pub fn any(children: Vec<VersionRequirement>) -> Self {
        Self {
            negative: false,
            node: RequirementNode::Any(children),
        }
    }

    /// Does `text` look like a plain version, e.g. `1.0`, `11.0-alpha`
    /// or `r09`? Leading letters other than a single `r` are rejected so
    /// that logical names such as `copied` are not mistaken for versions.
    pub fn is_version(text: &str) -> bool {
        let text = text.trim();
        let rest = text.strip_prefix('r').unwrap_or(text);
        rest.starts_with(|c: char| c.is_ascii_digit()) && rest.chars().all(is_version_char)
    }

    /// Does `text` contain any comparator, connective or parenthesis?
    pub fn is_requirement(text: &str) -> bool {
        text.contains(|c: char| "=!<>~&|()".contains(c))
    }

    pub(crate) fn from_node(node: RequirementNode) -> Self {
        Self {
            negative: false,
            node,
        }
    }

    pub fn node(&self) -> &RequirementNode {
        &self.node
    }

    pub(crate) fn into_node(self) -> RequirementNode {
        self.node
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Invert this requirement.
    pub fn negate(mut self) -> Self {
        self.negative = !self.negative;
        self
    }

    /// Whether this node combines more than one clause.
    pub fn is_composed(&self) -> bool {
        match &self.node {
            RequirementNode::Leaf { .. } => false,
            RequirementNode::All(c) | RequirementNode::Any(c) => c.len() > 1,
        }
    }

    /// True iff the top-level node is a non-negated alternative with more
    /// than one branch.
    pub fn has_alternatives(&self) -> bool {
        !self.negative && matches!(&self.node, RequirementNode::Any(c) if c.len() > 1)
    }

    /// True iff this is a single non-negated exact version, e.g. `1.2`
    /// or `=1.2`.
    pub fn is_pinned(&self) -> bool {
        !self.negative
            && matches!(
                self.node,
                RequirementNode::Leaf {
                    comparator: None | Some(Comparator::Eq),
                    ..
                }
            )
    }

    /// Whether looking for candidate versions can pick anything other than
    /// the pinned version itself.
    pub fn needs_search(&self) -> bool {
        self.has_alternatives() || !self.is_pinned()
    }

    /// The version to fall back on when no candidate satisfies this
    /// requirement.
    ///
    /// Clauses are scanned from last to first; the first leaf whose
    /// comparator is absent, `=`, `>=`, `<=` or `~>` supplies its version.
    /// Negated nodes never supply a default. `1 | 2 | 3` defaults to `3`.
    pub fn default_version(&self) -> Option<String> {
        if self.negative {
            return None;
        }
        match &self.node {
            RequirementNode::Leaf {
                comparator,
                version,
            } => match comparator {
                None => Some(version.to_string()),
                Some(c) if c.admits_own_version() => Some(version.to_string()),
                Some(_) => None,
            },
            RequirementNode::All(children) | RequirementNode::Any(children) => {
                children.iter().rev().find_map(|c| c.default_version())
            }
        }
    }

    /// Test a version string. Blank or unparseable versions never satisfy.
    pub fn satisfied_by(&self, version: &str) -> bool {
        match Version::parse(version) {
            Some(v) => self.satisfied_by_version(&v),
            None => false,
        }
    }

    pub fn satisfied_by_version(&self, version: &Version) -> bool {
        let result = match &self.node {
            RequirementNode::Leaf {
                comparator,
                version: required,
            } => comparator
                .unwrap_or(Comparator::Eq)
                .matches(version, required),
            RequirementNode::All(children) => {
                children.iter().all(|c| c.satisfied_by_version(version))
            }
            RequirementNode::Any(children) => {
                children.iter().any(|c| c.satisfied_by_version(version))
            }
        };
        result != self.negative
    }

    /// Combine two requirements, always allocating a new node.
    fn combine(self, other: Self, any: bool) -> Self {
        if any {
            Self::any(vec![self, other])
        } else {
            Self::all(vec![self, other])
        }
    }
}

impl BitAnd for VersionRequirement {
    type Output = VersionRequirement;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.combine(rhs, false)
    }
}

impl BitOr for VersionRequirement {
    type Output = VersionRequirement;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.combine(rhs, true)
    }
}

impl Not for VersionRequirement {
    type Output = VersionRequirement;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

impl std::str::FromStr for VersionRequirement {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match &self.node {
            RequirementNode::Leaf {
                comparator,
                version,
            } => match comparator {
                Some(c) => format!("{c}{version}"),
                None => version.to_string(),
            },
            RequirementNode::All(children) | RequirementNode::Any(children) => {
                let sep = if matches!(self.node, RequirementNode::Any(_)) {
                    " | "
                } else {
                    " & "
                };
                let joined = children
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(sep);
                if children.len() > 1 {
                    format!("( {joined} )")
                } else {
                    joined
                }
            }
        };
        if self.negative {
            if body.starts_with('(') {
                write!(f, "!{body}")
            } else {
                write!(f, "!( {body} )")
            }
        } else {
            f.write_str(&body)
        }
    }
}
