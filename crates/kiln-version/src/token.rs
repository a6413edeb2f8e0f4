//! Token definitions for requirement expressions.
//! 版本约束表达式的 token 定义。

use crate::requirement::Comparator;
use std::fmt;

/// A byte range in a requirement string.
/// 约束字符串中的字节范围。
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Start offset. / 起始偏移。
    pub start: usize,
    /// End offset (exclusive). / 结束偏移（不包含）。
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Create a span that covers both `self` and `other`.
    /// 创建一个覆盖 `self` 和 `other` 的范围。
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the text covered by this span, if it lies within `source`.
    /// 返回此范围在 `source` 中覆盖的文本。
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A token with its kind and span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A version literal such as `1.2.3`, `1.0-rc3` or `r09`.
    Version(String),
    /// A comparison operator: `=`, `!=`, `>`, `<`, `>=`, `<=`, `~>`.
    Cmp(Comparator),

    // Connectives
    And, // & && and
    Or,  // | || or
    Not, // ! not

    // Delimiters
    LParen, // (
    RParen, // )

    Eof,
}

impl TokenKind {
    /// Whether this token can begin an operand, used to insert the
    /// implicit `&` between adjacent clauses.
    /// 此 token 是否可以作为操作数的开头。
    pub fn starts_operand(&self) -> bool {
        matches!(
            self,
            TokenKind::Version(_) | TokenKind::Cmp(_) | TokenKind::Not | TokenKind::LParen
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Version(v) => write!(f, "{v}"),
            TokenKind::Cmp(c) => write!(f, "{c}"),
            TokenKind::And => write!(f, "&"),
            TokenKind::Or => write!(f, "|"),
            TokenKind::Not => write!(f, "!"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}
