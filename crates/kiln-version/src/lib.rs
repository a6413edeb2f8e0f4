//! Version requirements for Kiln.
//! Kiln 的版本约束。
//!
//! This crate provides the tolerant [`Version`] value used to compare
//! artifact versions, and the small requirement language accepted in the
//! version field of an artifact spec:
//!
//! ```text
//! >1.2 <1.3 !(>=1.2.5 | <=1.2.6)
//! ~>2.0 or =3.1
//! ```
//!
//! Requirements are tokenized by [`Lexer`], parsed by a recursive descent
//! [`Parser`] and evaluated by [`VersionRequirement::satisfied_by`].

mod lexer;
mod parser;
mod requirement;
mod token;
mod version;

pub use lexer::Lexer;
pub use parser::{ParseError, ParseErrorKind, Parser};
pub use requirement::{Comparator, RequirementNode, VersionRequirement};
pub use token::{Span, Token, TokenKind};
pub use version::{Segment, Version};

/// Parse a requirement expression.
pub fn parse(source: &str) -> Result<VersionRequirement, ParseError> {
    VersionRequirement::parse(source)
}
