//! The lexer implementation using logos.

use logos::Logos;
use ode_ast::token::{Token, TokenKind};
use ode_ast::Span;

/// Raw token type for logos - literal payloads are parsed in a second pass.
///
/// A `RawNewline` swallows the spaces that follow it, so leading indentation
/// always arrives attached to the newline that precedes the line. The
/// conversion pass splits it back into one `Newline` token plus one
/// `Whitespace` token per two-space unit. Interior spaces are skipped.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r" +")]
enum RawToken {
    // === Keywords ===
    #[token("if")]
    If,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("fn")]
    Fn,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // === Operators (order matters - longer first) ===
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,

    // === Comments (skip to end of line) ===
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    // === Newline plus the indentation of the following line ===
    #[regex(r"\r?\n[ ]*")]
    Newline,

    // === Literals ===
    // Digit run with at most one decimal point; "52." is a valid number
    #[regex(r"[0-9]+(\.[0-9]*)?")]
    Number,

    // Double-quoted, single-line; a backslash escapes the next character
    #[regex(r#""([^"\\\r\n]|\\[^\r\n])*""#)]
    Str,

    // === Identifier (must come after keywords) ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

/// The lexer for Ode source code.
pub struct Lexer<'a> {
    source: &'a str,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Tokenize the entire source.
    ///
    /// Fails on the first error: bad indentation, an unterminated string, or
    /// an unexpected character.
    pub fn tokenize(&self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        // The first line has no preceding newline to carry its indentation.
        let head_spaces = self.source.bytes().take_while(|b| *b == b' ').count();
        self.emit_indent(&mut tokens, 0, head_spaces)?;

        let mut logos_lexer = RawToken::lexer(self.source);
        while let Some(result) = logos_lexer.next() {
            let span = logos_lexer.span();
            let slice = logos_lexer.slice();

            let raw = match result {
                Ok(raw) => raw,
                Err(()) => {
                    let ch = self.source[span.start..].chars().next().unwrap_or('?');
                    return Err(if ch == '"' {
                        LexError::unterminated_string(span.start, self.source.len())
                    } else {
                        LexError::unexpected_char(ch, span.start)
                    });
                }
            };

            match raw {
                RawToken::Newline => {
                    let spaces = slice.len() - slice.trim_end_matches(' ').len();
                    let newline_end = span.end - spaces;
                    tokens.push(Token {
                        kind: TokenKind::Newline,
                        span: Span::new(span.start, newline_end),
                    });
                    self.emit_indent(&mut tokens, newline_end, spaces)?;
                }
                raw => {
                    let kind = self.convert_token(raw, slice, span.start, span.end)?;
                    tokens.push(Token {
                        kind,
                        span: Span::new(span.start, span.end),
                    });
                }
            }
        }

        // Every physical line ends in a Newline token, even when the file
        // has no trailing newline character.
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Newline)) {
            tokens.push(Token {
                kind: TokenKind::Newline,
                span: Span::new(self.source.len(), self.source.len()),
            });
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::new(self.source.len(), self.source.len()),
        });

        Ok(tokens)
    }

    /// Expand a run of leading spaces into Whitespace tokens, one per
    /// two-space unit. An odd number of spaces is an error.
    fn emit_indent(&self, tokens: &mut Vec<Token>, start: usize, spaces: usize) -> Result<(), LexError> {
        if spaces % 2 != 0 {
            return Err(LexError::bad_indentation(start, start + spaces));
        }
        for unit in 0..spaces / 2 {
            let offset = start + unit * 2;
            tokens.push(Token {
                kind: TokenKind::Whitespace,
                span: Span::new(offset, offset + 2),
            });
        }
        Ok(())
    }

    /// Convert a raw logos token to our TokenKind, parsing literals.
    fn convert_token(&self, raw: RawToken, slice: &str, start: usize, end: usize) -> Result<TokenKind, LexError> {
        Ok(match raw {
            // Keywords
            RawToken::If => TokenKind::If,
            RawToken::Elif => TokenKind::Elif,
            RawToken::Else => TokenKind::Else,
            RawToken::While => TokenKind::While,
            RawToken::For => TokenKind::For,
            RawToken::In => TokenKind::In,
            RawToken::Fn => TokenKind::Fn,
            RawToken::Return => TokenKind::Return,
            RawToken::Break => TokenKind::Break,
            RawToken::Continue => TokenKind::Continue,
            RawToken::And => TokenKind::And,
            RawToken::Or => TokenKind::Or,
            RawToken::True => TokenKind::Bool(true),
            RawToken::False => TokenKind::Bool(false),

            // Operators
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::Eq => TokenKind::Eq,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::BangEq => TokenKind::BangEq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::Gt => TokenKind::Gt,
            RawToken::Bang => TokenKind::Bang,
            RawToken::PlusEq => TokenKind::PlusEq,
            RawToken::MinusEq => TokenKind::MinusEq,
            RawToken::StarEq => TokenKind::StarEq,
            RawToken::SlashEq => TokenKind::SlashEq,
            RawToken::PercentEq => TokenKind::PercentEq,
            RawToken::PlusPlus => TokenKind::PlusPlus,
            RawToken::MinusMinus => TokenKind::MinusMinus,

            // Delimiters
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Colon => TokenKind::Colon,

            // Literals
            RawToken::Number => {
                let value = slice.parse::<f32>().map_err(|_| LexError::invalid_number(start, end))?;
                TokenKind::Number(value)
            }
            RawToken::Str => {
                let inner = &slice[1..slice.len() - 1];
                TokenKind::Str(unescape(inner))
            }
            RawToken::Ident => TokenKind::Ident(slice.to_string()),

            // These are skipped by logos or handled by the caller
            RawToken::LineComment | RawToken::Newline => {
                unreachable!("handled before conversion")
            }
        })
    }
}

/// Resolve escapes: a backslash drops out and the following character is
/// taken literally, whatever it is.
fn unescape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                result.push(next);
            }
        } else {
            result.push(c);
        }
    }
    result
}

/// A lexer error with location and message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct LexError {
    pub span: Span,
    pub message: String,
}

impl LexError {
    fn unexpected_char(ch: char, pos: usize) -> Self {
        Self {
            span: Span::new(pos, pos + ch.len_utf8()),
            message: format!("Unexpected character '{}'", ch),
        }
    }

    fn unterminated_string(start: usize, end: usize) -> Self {
        Self {
            span: Span::new(start, end),
            message: "Unterminated string".to_string(),
        }
    }

    fn bad_indentation(start: usize, end: usize) -> Self {
        Self {
            span: Span::new(start, end),
            message: "Bad spacing at start of line; indentation must be in two-space units".to_string(),
        }
    }

    fn invalid_number(start: usize, end: usize) -> Self {
        Self {
            span: Span::new(start, end),
            message: "Invalid number".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ode_ast::LineMap;
    use TokenKind::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .expect("lex error")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn basic_arithmetic() {
        assert_eq!(
            kinds("16+52"),
            vec![Number(16.0), Plus, Number(52.0), Newline, Eof]
        );
    }

    #[test]
    fn numbers_with_decimal_points() {
        assert_eq!(
            kinds("16.2+52.+51\n61"),
            vec![
                Number(16.2),
                Plus,
                Number(52.0),
                Plus,
                Number(51.0),
                Newline,
                Number(61.0),
                Newline,
                Eof
            ]
        );
    }

    #[test]
    fn indentation_becomes_whitespace_tokens() {
        assert_eq!(
            kinds("while true\n    x = 1"),
            vec![
                While,
                Bool(true),
                Newline,
                Whitespace,
                Whitespace,
                Ident("x".into()),
                Eq,
                Number(1.0),
                Newline,
                Eof
            ]
        );
    }

    #[test]
    fn first_line_indentation() {
        assert_eq!(
            kinds("  x"),
            vec![Whitespace, Ident("x".into()), Newline, Eof]
        );
    }

    #[test]
    fn odd_indentation_is_an_error() {
        let err = Lexer::new("if x\n   y").tokenize().unwrap_err();
        assert!(err.message.contains("two-space"));

        let err = Lexer::new(" x").tokenize().unwrap_err();
        assert!(err.message.contains("two-space"));
    }

    #[test]
    fn blank_line_keeps_its_indentation_tokens() {
        assert_eq!(
            kinds("x\n  \ny"),
            vec![
                Ident("x".into()),
                Newline,
                Whitespace,
                Newline,
                Ident("y".into()),
                Newline,
                Eof
            ]
        );
    }

    #[test]
    fn strings_and_escapes() {
        assert_eq!(
            kinds(r#"x = "say \"hi\"""#),
            vec![
                Ident("x".into()),
                Eq,
                Str(r#"say "hi""#.into()),
                Newline,
                Eof
            ]
        );
        // The backslash escapes any single character by dropping out.
        assert_eq!(kinds(r#""a\nb""#), vec![Str("anb".into()), Newline, Eof]);
        assert_eq!(kinds(r#""a\\b""#), vec![Str(r"a\b".into()), Newline, Eof]);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = Lexer::new("x = \"abc").tokenize().unwrap_err();
        assert_eq!(err.message, "Unterminated string");
    }

    #[test]
    fn unexpected_character_is_an_error() {
        let err = Lexer::new("x = @").tokenize().unwrap_err();
        assert_eq!(err.message, "Unexpected character '@'");
        assert_eq!(err.span.start, 4);
    }

    #[test]
    fn comments_run_to_end_of_line() {
        assert_eq!(
            kinds("x = 1 // note: not tokens\ny"),
            vec![
                Ident("x".into()),
                Eq,
                Number(1.0),
                Newline,
                Ident("y".into()),
                Newline,
                Eof
            ]
        );
    }

    #[test]
    fn keywords_are_whole_words() {
        assert_eq!(
            kinds("iffy = input"),
            vec![
                Ident("iffy".into()),
                Eq,
                Ident("input".into()),
                Newline,
                Eof
            ]
        );
        assert_eq!(
            kinds("for i in x"),
            vec![For, Ident("i".into()), In, Ident("x".into()), Newline, Eof]
        );
    }

    #[test]
    fn compound_operators_win_over_single() {
        assert_eq!(
            kinds("x += 1 == 2"),
            vec![
                Ident("x".into()),
                PlusEq,
                Number(1.0),
                EqEq,
                Number(2.0),
                Newline,
                Eof
            ]
        );
    }

    #[test]
    fn spans_match_source_positions() {
        let source = "a = 1\nb = 2";
        let tokens = Lexer::new(source).tokenize().unwrap();
        let map = LineMap::new(source);

        let b = tokens
            .iter()
            .find(|t| t.kind == Ident("b".into()))
            .unwrap();
        assert_eq!(map.line_col(b.span.start), (2, 1));

        let two = tokens.iter().find(|t| t.kind == Number(2.0)).unwrap();
        assert_eq!(map.line_col(two.span.start), (2, 5));
    }

    #[test]
    fn empty_source_still_terminates() {
        assert_eq!(kinds(""), vec![Newline, Eof]);
    }
}
