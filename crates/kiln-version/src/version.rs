//! Tolerant version values.
//!
//! Artifact versions in the wild are not semantic versions: `1.2`,
//! `1.5.6.7`, `2.0-rc3` and `r09` all occur. A [`Version`] splits its
//! text into numeric and alphabetic segments and compares them
//! segment-wise, so that trailing zeros are insignificant (`1 == 1.0.0`)
//! and alphabetic segments sort below numeric ones (`1.0.rc1 < 1.0`).

use std::cmp::Ordering;
use std::fmt;

/// One component of a version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Num(u64),
    Text(String),
}

impl Segment {
    fn is_zero(&self) -> bool {
        matches!(self, Segment::Num(0))
    }

    fn is_text(&self) -> bool {
        matches!(self, Segment::Text(_))
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Segment::Num(a), Segment::Num(b)) => a.cmp(b),
            (Segment::Text(a), Segment::Text(b)) => a.cmp(b),
            (Segment::Text(_), Segment::Num(_)) => Ordering::Less,
            (Segment::Num(_), Segment::Text(_)) => Ordering::Greater,
        }
    }
}

/// A parsed version.
///
/// Equality follows the ordering, not the text: `Version::parse("1")` equals
/// `Version::parse("1.0")`.
#[derive(Debug, Clone)]
pub struct Version {
    text: String,
    segments: Vec<Segment>,
}

impl Version {
    /// Parse a version. Returns `None` for blank input or input without
    /// any alphanumeric segment.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let mut segments = Vec::new();
        let mut chars = text.chars().peekable();

        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                let mut digits = String::new();
                while let Some(&d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                    digits.push(d);
                    chars.next();
                }
                // Overlong numbers saturate instead of failing.
                segments.push(Segment::Num(digits.parse().unwrap_or(u64::MAX)));
            } else if c.is_ascii_alphabetic() {
                let mut word = String::new();
                while let Some(&a) = chars.peek().filter(|a| a.is_ascii_alphabetic()) {
                    word.push(a);
                    chars.next();
                }
                segments.push(Segment::Text(word));
            } else {
                chars.next();
            }
        }

        if segments.is_empty() {
            return None;
        }

        Some(Self {
            text: text.to_string(),
            segments,
        })
    }

    /// The original text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether any segment is alphabetic, e.g. `1.0-rc3`.
    pub fn is_prerelease(&self) -> bool {
        self.segments.iter().any(Segment::is_text)
    }

    /// The version with everything from the first alphabetic segment on
    /// removed: `1.0.rc3` becomes `1.0`.
    pub fn release(&self) -> Version {
        let segments: Vec<Segment> = self
            .segments
            .iter()
            .take_while(|s| !s.is_text())
            .cloned()
            .collect();
        Version::from_segments(segments)
    }

    /// The exclusive upper bound of `~>` for this version: drop any
    /// alphabetic segments, drop the last component when more than one
    /// remains, then increment the new last component.
    ///
    /// `5.3.1` bumps to `5.4`, `5.3` to `6`, `5` to `6`.
    pub fn bump(&self) -> Version {
        let mut segments: Vec<Segment> = self.release().segments;
        if segments.len() > 1 {
            segments.pop();
        }
        match segments.last_mut() {
            Some(Segment::Num(n)) => *n = n.saturating_add(1),
            _ => segments.push(Segment::Num(1)),
        }
        Version::from_segments(segments)
    }

    fn from_segments(segments: Vec<Segment>) -> Version {
        let text = segments
            .iter()
            .map(|s| match s {
                Segment::Num(n) => n.to_string(),
                Segment::Text(t) => t.clone(),
            })
            .collect::<Vec<_>>()
            .join(".");
        Version { text, segments }
    }

    /// Segments with trailing zeros removed, the form used for comparison.
    fn canonical(&self) -> &[Segment] {
        let mut end = self.segments.len();
        while end > 1 && self.segments[end - 1].is_zero() {
            end -= 1;
        }
        &self.segments[..end]
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.canonical();
        let rhs = other.canonical();
        let zero = Segment::Num(0);
        for i in 0..lhs.len().max(rhs.len()) {
            let a = lhs.get(i).unwrap_or(&zero);
            let b = rhs.get(i).unwrap_or(&zero);
            match a.cmp(b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
