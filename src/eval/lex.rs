use crate::types::span::Span;
use crate::{Error, Result};

/// A lexer for the small script subset understood by the default evaluator.
///
/// Whitespace and `//` line comments are skipped, line breaks are kept since
/// they separate statements just like `;`.
pub struct Lexer<'a> {
    /// The fragment code.
    source: &'a str,

    /// A cursor over the fragment code.
    cursor: usize,

    /// The previous token, a number directly after a `.` is a list index.
    prev: Option<Token>,
}

/// The unit yielded by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// An identifier or keyword, e.g. `user` or `var`
    Ident,
    /// A number literal, e.g. `42` or `3.14`
    Number,
    /// A list index in a path, e.g. the `0` in `users.0`
    Index,
    /// A string literal, e.g. `"Hello"` or `'Hello'`
    String,
    /// `.`
    Dot,
    /// `=`
    Equals,
    /// `-`
    Minus,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `;`
    Semicolon,
    /// A line break
    Newline,
}

/// Split the fragment code into tokens.
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(next) = lexer.lex()? {
        tokens.push(next);
    }
    Ok(tokens)
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            cursor: 0,
            prev: None,
        }
    }

    fn lex(&mut self) -> Result<Option<(Token, Span)>> {
        loop {
            let i = self.cursor;
            let mut iter = self.source[i..].char_indices().map(|(d, c)| (i + d, c));
            let Some((i, c)) = iter.next() else {
                return Ok(None);
            };

            let (tk, j) = match c {
                // Single character to token mappings.
                '.' => (Token::Dot, i + 1),
                '=' => (Token::Equals, i + 1),
                '-' => (Token::Minus, i + 1),
                '(' => (Token::OpenParen, i + 1),
                ')' => (Token::CloseParen, i + 1),
                ';' => (Token::Semicolon, i + 1),
                '\n' => (Token::Newline, i + 1),

                '/' if self.source[i..].starts_with("//") => {
                    self.cursor = self.lex_while(iter, |c| c != '\n');
                    continue;
                }
                c if is_whitespace(c) => {
                    self.cursor = self.lex_while(iter, is_whitespace);
                    continue;
                }

                // Multi-character tokens with a distinct start character.
                '"' | '\'' => self.lex_string(iter, i, c)?,
                c if c.is_ascii_digit() => match self.prev {
                    Some(Token::Dot) => (Token::Index, self.lex_while(iter, is_index)),
                    _ => (Token::Number, self.lex_while(iter, is_number)),
                },
                c if is_ident_start(c) => (Token::Ident, self.lex_while(iter, is_ident)),

                // Any other character...
                c => {
                    return Err(self.err_unexpected_character(c));
                }
            };

            self.cursor = j;
            self.prev = Some(tk);
            return Ok(Some((tk, Span::from(i..j))));
        }
    }

    fn lex_string<I>(&self, mut iter: I, i: usize, quote: char) -> Result<(Token, usize)>
    where
        I: Iterator<Item = (usize, char)> + Clone,
    {
        let mut curr = quote;
        loop {
            match iter.next() {
                None | Some((_, '\r' | '\n')) => {
                    return Err(self.err_undelimited_string(i));
                }
                Some((j, c)) if c == quote && curr != '\\' => {
                    return Ok((Token::String, j + 1));
                }
                Some((_, '\\')) if curr == '\\' => {
                    // An escaped backslash can't escape the next character.
                    curr = ' ';
                }
                Some((_, c)) => {
                    curr = c;
                }
            }
        }
    }

    fn lex_while<I, P>(&self, mut iter: I, pred: P) -> usize
    where
        I: Iterator<Item = (usize, char)> + Clone,
        P: Fn(char) -> bool,
    {
        loop {
            match iter.clone().next() {
                Some((_, c)) if pred(c) => {
                    iter.next();
                }
                Some((j, _)) => return j,
                None => return self.source.len(),
            }
        }
    }

    fn err_unexpected_character(&self, c: char) -> Error {
        Error::eval(format!(
            "unexpected character `{c}` in `{}`",
            self.source.trim()
        ))
    }

    fn err_undelimited_string(&self, i: usize) -> Error {
        Error::eval(format!(
            "undelimited string `{}` in `{}`",
            self.source[i..].lines().next().unwrap_or_default(),
            self.source.trim()
        ))
    }
}

impl Token {
    pub fn human(&self) -> &'static str {
        match self {
            Self::Ident => "identifier",
            Self::Number => "number",
            Self::Index => "index",
            Self::String => "string",
            Self::Dot => "member access",
            Self::Equals => "assignment",
            Self::Minus => "minus",
            Self::OpenParen => "open parenthesis",
            Self::CloseParen => "close parenthesis",
            Self::Semicolon => "semicolon",
            Self::Newline => "line break",
        }
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | ' ' | '\r')
}

#[cfg(feature = "unicode")]
fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || unicode_ident::is_xid_start(c)
}

#[cfg(feature = "unicode")]
fn is_ident(c: char) -> bool {
    c == '$' || unicode_ident::is_xid_continue(c)
}

#[cfg(not(feature = "unicode"))]
fn is_ident_start(c: char) -> bool {
    matches!(c, 'A'..='Z' | 'a'..='z' | '_' | '$')
}

#[cfg(not(feature = "unicode"))]
fn is_ident(c: char) -> bool {
    matches!(c, '0'..='9' | 'A'..='Z' | 'a'..='z' | '_' | '$')
}

fn is_index(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_number(c: char) -> bool {
    matches!(c, '0'..='9' | '.' | 'e' | 'E')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_path_with_index() {
        let tokens = lex("users.0.name").unwrap();
        assert_eq!(
            tokens,
            [
                (Token::Ident, "users"),
                (Token::Dot, "."),
                (Token::Index, "0"),
                (Token::Dot, "."),
                (Token::Ident, "name"),
            ]
        );
    }

    #[test]
    fn lex_statements() {
        let tokens = lex("var x = -1.5; echo('a;b')\n$y = \"q\\\"\"").unwrap();
        assert_eq!(
            tokens,
            [
                (Token::Ident, "var"),
                (Token::Ident, "x"),
                (Token::Equals, "="),
                (Token::Minus, "-"),
                (Token::Number, "1.5"),
                (Token::Semicolon, ";"),
                (Token::Ident, "echo"),
                (Token::OpenParen, "("),
                (Token::String, "'a;b'"),
                (Token::CloseParen, ")"),
                (Token::Newline, "\n"),
                (Token::Ident, "$y"),
                (Token::Equals, "="),
                (Token::String, "\"q\\\"\""),
            ]
        );
    }

    #[test]
    fn lex_line_comment() {
        let tokens = lex(" x // the value; y\n z").unwrap();
        assert_eq!(
            tokens,
            [
                (Token::Ident, "x"),
                (Token::Newline, "\n"),
                (Token::Ident, "z"),
            ]
        );
    }

    #[test]
    fn lex_string_escaped_backslash() {
        let tokens = lex(r#""a\\" b"#).unwrap();
        assert_eq!(tokens, [(Token::String, r#""a\\""#), (Token::Ident, "b")]);
    }

    #[test]
    fn lex_err_unexpected_character() {
        let err = lex("a + b").unwrap_err();
        assert_eq!(err.to_string(), "unexpected character `+` in `a + b`");
    }

    #[test]
    fn lex_err_undelimited_string() {
        let err = lex(" x = 'abc").unwrap_err();
        assert_eq!(err.to_string(), "undelimited string `'abc` in `x = 'abc`");
    }

    #[track_caller]
    fn lex(source: &str) -> Result<Vec<(Token, &str)>> {
        let tokens = tokenize(source)?;
        Ok(tokens
            .into_iter()
            .map(|(tk, sp)| (tk, &source[sp]))
            .collect())
    }
}
