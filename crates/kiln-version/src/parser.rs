//! The requirement parser.
//!
//! A small recursive descent parser over the tokens produced by
//! [`crate::Lexer`]:
//!
//! ```text
//! expr    := and_expr ( '|' and_expr )*
//! and_expr:= unary ( '&'? unary )*
//! unary   := '!' unary | primary
//! primary := '(' expr ')' | comparator? version
//! ```
//!
//! Adjacent clauses without a connective are joined with `&`. Chains of
//! the same connective are flattened into one node.

use crate::requirement::{RequirementNode, VersionRequirement};
use crate::token::{Span, Token, TokenKind};
use crate::version::Version;
use thiserror::Error;

/// How deeply parentheses may nest.
pub const MAX_NESTING: usize = 64;

/// Why a requirement failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("contains invalid character {0:?}")]
    InvalidCharacter(char),
    #[error("malformed clause {0:?}")]
    MalformedClause(String),
    #[error("unbalanced parenthesis")]
    UnbalancedParen,
    #[error("unexpected {0}")]
    Unexpected(String),
    #[error("empty requirement")]
    Empty,
    #[error("groups nested deeper than {MAX_NESTING}")]
    TooDeep,
}

/// A requirement that could not be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("failed to parse {input:?}: {kind}")]
pub struct ParseError {
    pub input: String,
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    pub fn new(source: &str, kind: ParseErrorKind, span: Span) -> Self {
        Self {
            input: source.to_string(),
            kind,
            span,
        }
    }
}

/// The requirement parser.
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Parse the whole token stream into one requirement.
    pub fn parse(mut self) -> Result<VersionRequirement, ParseError> {
        if self.at_end() {
            return Err(self.error(ParseErrorKind::Empty));
        }
        let requirement = self.parse_expr()?;
        match self.current_kind() {
            TokenKind::Eof => Ok(requirement),
            TokenKind::RParen => Err(self.error(ParseErrorKind::UnbalancedParen)),
            other => {
                let found = other.to_string();
                Err(self.error(ParseErrorKind::Unexpected(found)))
            }
        }
    }

    fn parse_expr(&mut self) -> Result<VersionRequirement, ParseError> {
        let mut branches = vec![self.parse_and()?];
        while self.eat(&TokenKind::Or) {
            branches.push(self.parse_and()?);
        }
        Ok(join(branches, true))
    }

    fn parse_and(&mut self) -> Result<VersionRequirement, ParseError> {
        let mut clauses = vec![self.parse_unary()?];
        loop {
            if self.eat(&TokenKind::And) || self.current_kind().starts_operand() {
                clauses.push(self.parse_unary()?);
            } else {
                break;
            }
        }
        Ok(join(clauses, false))
    }

    fn parse_unary(&mut self) -> Result<VersionRequirement, ParseError> {
        let mut negations = 0usize;
        while self.eat(&TokenKind::Not) {
            negations += 1;
        }
        let operand = self.parse_primary()?;
        Ok(if negations % 2 == 1 {
            operand.negate()
        } else {
            operand
        })
    }

    fn parse_primary(&mut self) -> Result<VersionRequirement, ParseError> {
        match self.current_kind().clone() {
            TokenKind::LParen => {
                if self.depth >= MAX_NESTING {
                    return Err(self.error(ParseErrorKind::TooDeep));
                }
                self.advance();
                self.depth += 1;
                let inner = self.parse_expr()?;
                if !self.eat(&TokenKind::RParen) {
                    return Err(self.error(ParseErrorKind::UnbalancedParen));
                }
                self.depth -= 1;
                Ok(inner)
            }
            TokenKind::Cmp(comparator) => {
                let start = self.current_span();
                self.advance();
                match self.current_kind().clone() {
                    TokenKind::Version(text) => {
                        let version = self.version(&text)?;
                        self.advance();
                        Ok(VersionRequirement::leaf(Some(comparator), version))
                    }
                    _ => {
                        let span = start.merge(self.current_span());
                        Err(ParseError::new(
                            self.source,
                            ParseErrorKind::MalformedClause(span.slice(self.source).to_string()),
                            span,
                        ))
                    }
                }
            }
            TokenKind::Version(text) => {
                let version = self.version(&text)?;
                self.advance();
                Ok(VersionRequirement::leaf(None, version))
            }
            TokenKind::RParen if self.depth == 0 => Err(self.error(ParseErrorKind::UnbalancedParen)),
            other => Err(self.error(ParseErrorKind::Unexpected(other.to_string()))),
        }
    }

    fn version(&self, text: &str) -> Result<Version, ParseError> {
        Version::parse(text)
            .ok_or_else(|| self.error(ParseErrorKind::MalformedClause(text.to_string())))
    }

    fn current(&self) -> &Token {
        // The lexer always terminates the stream with `Eof`.
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn current_span(&self) -> Span {
        self.current().span
    }

    fn at_end(&self) -> bool {
        self.tokens.is_empty() || matches!(self.current_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) {
        if !self.at_end() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.current_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        let span = if self.tokens.is_empty() {
            Span::default()
        } else {
            self.current_span()
        };
        ParseError::new(self.source, kind, span)
    }
}

/// Join parsed operands, flattening nested nodes of the same connective.
fn join(mut operands: Vec<VersionRequirement>, any: bool) -> VersionRequirement {
    if operands.len() == 1 {
        if let Some(only) = operands.pop() {
            return only;
        }
    }
    let mut flat = Vec::with_capacity(operands.len());
    for operand in operands {
        let same = !operand.is_negative()
            && match operand.node() {
                RequirementNode::Any(_) => any,
                RequirementNode::All(_) => !any,
                RequirementNode::Leaf { .. } => false,
            };
        if same {
            match operand.into_node() {
                RequirementNode::Any(children) | RequirementNode::All(children) => {
                    flat.extend(children)
                }
                leaf => flat.push(VersionRequirement::from_node(leaf)),
            }
        } else {
            flat.push(operand);
        }
    }
    if any {
        VersionRequirement::any(flat)
    } else {
        VersionRequirement::all(flat)
    }
}
