//! The requirement lexer.
//! 版本约束词法分析器。

use crate::parser::{ParseError, ParseErrorKind};
use crate::requirement::Comparator;
use crate::token::{Span, Token, TokenKind};

/// Converts a requirement string into a sequence of tokens.
/// 将约束字符串转换为 token 序列。
pub struct Lexer<'src> {
    source: &'src str,
    /// Character iterator with position info
    /// 带位置信息的字符迭代器
    chars: std::iter::Peekable<std::str::CharIndices<'src>>,
    /// Current position in source
    /// 当前在源码中的位置
    pos: usize,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given requirement string.
    /// 为给定的约束字符串创建新的词法分析器。
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            pos: 0,
        }
    }

    /// Tokenize the whole input. The last token is always [`TokenKind::Eof`].
    /// 对整个输入进行词法分析，最后一个 token 总是 `Eof`。
    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();

        let start = self.pos;
        let Some((_, ch)) = self.advance() else {
            return Ok(Token::new(TokenKind::Eof, Span::new(start, start)));
        };

        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '&' => {
                if self.peek_char() == Some('&') {
                    self.advance();
                }
                TokenKind::And
            }
            '|' => {
                if self.peek_char() == Some('|') {
                    self.advance();
                }
                TokenKind::Or
            }
            '!' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::Cmp(Comparator::Ne)
                } else {
                    TokenKind::Not
                }
            }
            '=' => TokenKind::Cmp(Comparator::Eq),
            '>' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::Cmp(Comparator::Ge)
                } else {
                    TokenKind::Cmp(Comparator::Gt)
                }
            }
            '<' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::Cmp(Comparator::Le)
                } else {
                    TokenKind::Cmp(Comparator::Lt)
                }
            }
            '~' => {
                if self.peek_char() == Some('>') {
                    self.advance();
                    TokenKind::Cmp(Comparator::Compatible)
                } else {
                    return Err(self.error(ParseErrorKind::MalformedClause("~".into()), start));
                }
            }
            c if is_version_char(c) => self.word(start),
            other => {
                return Err(self.error(ParseErrorKind::InvalidCharacter(other), start));
            }
        };

        Ok(Token::new(kind, Span::new(start, self.pos)))
    }

    /// Lex a run of version characters, recognising the word connectives.
    /// 词法分析版本字符序列，并识别单词形式的连接词。
    fn word(&mut self, start: usize) -> TokenKind {
        while let Some(c) = self.peek_char() {
            if is_version_char(c) {
                self.advance();
            } else {
                break;
            }
        }
        match &self.source[start..self.pos] {
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            text => TokenKind::Version(text.to_string()),
        }
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((pos, ch)) = result {
            self.pos = pos + ch.len_utf8();
        }
        result
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn error(&self, kind: ParseErrorKind, start: usize) -> ParseError {
        ParseError::new(self.source, kind, Span::new(start, self.pos))
    }
}

/// Characters allowed inside a version literal.
/// 版本字面量中允许的字符。
pub(crate) fn is_version_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_comparators() {
        assert_eq!(
            kinds(">= <= != ~> = > <"),
            vec![
                TokenKind::Cmp(Comparator::Ge),
                TokenKind::Cmp(Comparator::Le),
                TokenKind::Cmp(Comparator::Ne),
                TokenKind::Cmp(Comparator::Compatible),
                TokenKind::Cmp(Comparator::Eq),
                TokenKind::Cmp(Comparator::Gt),
                TokenKind::Cmp(Comparator::Lt),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_word_connectives() {
        assert_eq!(
            kinds("1 and 2 or not 3"),
            vec![
                TokenKind::Version("1".into()),
                TokenKind::And,
                TokenKind::Version("2".into()),
                TokenKind::Or,
                TokenKind::Not,
                TokenKind::Version("3".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_doubled_connectives() {
        assert_eq!(
            kinds("1&&2||3"),
            vec![
                TokenKind::Version("1".into()),
                TokenKind::And,
                TokenKind::Version("2".into()),
                TokenKind::Or,
                TokenKind::Version("3".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_not_before_comparator() {
        assert_eq!(
            kinds("!<=0.5"),
            vec![
                TokenKind::Not,
                TokenKind::Cmp(Comparator::Le),
                TokenKind::Version("0.5".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_hyphenated_version() {
        assert_eq!(
            kinds("1.0-rc3"),
            vec![TokenKind::Version("1.0-rc3".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_invalid_character() {
        let err = Lexer::new("1.0rc`exit`").tokenize().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidCharacter('`'));
        assert_eq!(err.span, Span::new(5, 6));
    }

    #[test]
    fn test_lone_tilde() {
        let err = Lexer::new("~1.0").tokenize().unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::MalformedClause(_)));
    }
}
