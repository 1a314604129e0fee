use crate::eval::lex::{self, Token};
use crate::types::span::Span;
use crate::{Error, Result, Value};

/// A statement in an eval fragment, e.g. `<% var x = user.name %>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<'a> {
    /// `var x = expr`, `let x = expr` or `const x = expr`
    Declare(&'a str, Expr<'a>),
    /// `x = expr`
    Assign(&'a str, Expr<'a>),
    /// `echo(expr)` or `echo()`
    Call(&'a str, Option<Expr<'a>>),
    /// A bare expression, evaluated and discarded.
    Expr(Expr<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    /// A string, number, boolean or null literal.
    Literal(Value),
    /// A variable with optional members, e.g. `user.names.0`
    Path(Vec<&'a str>),
}

/// A parser for the script subset understood by the default evaluator.
///
/// Like the lexer it never recurses, expressions are either a literal or a
/// path so a single token of lookahead is always enough.
pub struct Parser<'a> {
    /// The fragment code.
    source: &'a str,

    /// The lexed tokens of the fragment.
    tokens: Vec<(Token, Span)>,

    /// A cursor over the tokens.
    cursor: usize,
}

#[derive(Clone, Copy)]
enum Sign {
    Neg,
    Pos,
}

impl<'a> Parser<'a> {
    /// Construct a new parser.
    pub fn new(source: &'a str) -> Result<Self> {
        Ok(Self {
            source,
            tokens: lex::tokenize(source)?,
            cursor: 0,
        })
    }

    /// Parses statements separated by `;` or line breaks.
    pub fn parse_stmts(mut self) -> Result<Vec<Stmt<'a>>> {
        let mut stmts = Vec::new();
        loop {
            self.skip_separators();
            if self.peek().is_none() {
                break;
            }
            stmts.push(self.parse_stmt()?);
            match self.next() {
                None | Some((Token::Semicolon | Token::Newline, _)) => {}
                Some((tk, _)) => return Err(self.err_unexpected_token(tk)),
            }
        }
        Ok(stmts)
    }

    /// Parses exactly one expression, surrounding separators are allowed.
    pub fn parse_single_expr(mut self) -> Result<Expr<'a>> {
        self.skip_separators();
        let expr = self.parse_expr()?;
        self.skip_separators();
        match self.next() {
            None => Ok(expr),
            Some((tk, _)) => Err(self.err_unexpected_token(tk)),
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt<'a>> {
        let first = self.peek();
        let second = self.tokens.get(self.cursor + 1).map(|(tk, _)| *tk);
        match (first, second) {
            (Some((Token::Ident, span)), Some(Token::Ident))
                if matches!(&self.source[span], "var" | "let" | "const") =>
            {
                self.next();
                let name = self.expect(Token::Ident)?;
                self.expect(Token::Equals)?;
                let expr = self.parse_expr()?;
                Ok(Stmt::Declare(name, expr))
            }

            (Some((Token::Ident, _)), Some(Token::Equals)) => {
                let name = self.expect(Token::Ident)?;
                self.expect(Token::Equals)?;
                let expr = self.parse_expr()?;
                Ok(Stmt::Assign(name, expr))
            }

            (Some((Token::Ident, _)), Some(Token::OpenParen)) => {
                let name = self.expect(Token::Ident)?;
                self.expect(Token::OpenParen)?;
                let arg = match self.peek() {
                    Some((Token::CloseParen, _)) => None,
                    _ => Some(self.parse_expr()?),
                };
                self.expect(Token::CloseParen)?;
                Ok(Stmt::Call(name, arg))
            }

            _ => Ok(Stmt::Expr(self.parse_expr()?)),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr<'a>> {
        let source = self.source;
        let (tk, span) = self.parse()?;
        let raw = &source[span];
        let expr = match tk {
            Token::String => Expr::Literal(Value::String(self.parse_string(raw)?)),
            Token::Number => Expr::Literal(self.parse_number(raw, Sign::Pos)?),
            Token::Minus => {
                let raw = self.expect(Token::Number)?;
                Expr::Literal(self.parse_number(raw, Sign::Neg)?)
            }
            Token::Ident => match raw {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" | "undefined" => Expr::Literal(Value::None),
                _ => Expr::Path(self.parse_path(raw)?),
            },
            tk => return Err(self.err_unexpected_token(tk)),
        };
        Ok(expr)
    }

    fn parse_path(&mut self, first: &'a str) -> Result<Vec<&'a str>> {
        let source = self.source;
        let mut path = vec![first];
        while let Some((Token::Dot, _)) = self.peek() {
            self.next();
            match self.parse()? {
                (Token::Ident | Token::Index, span) => path.push(&source[span]),
                (tk, _) => return Err(self.err_unexpected_token(tk)),
            }
        }
        Ok(path)
    }

    /// Parses an integer, falling back to a float.
    fn parse_number(&self, raw: &str, sign: Sign) -> Result<Value> {
        let int = match sign {
            Sign::Pos => raw.parse::<i64>(),
            Sign::Neg => format!("-{raw}").parse::<i64>(),
        };
        if let Ok(int) = int {
            return Ok(Value::Integer(int));
        }
        let float: f64 = raw.parse().map_err(|_| {
            Error::eval(format!(
                "invalid number literal `{raw}` in `{}`",
                self.source.trim()
            ))
        })?;
        match sign {
            Sign::Neg => Ok(Value::Float(-float)),
            Sign::Pos => Ok(Value::Float(float)),
        }
    }

    /// Parses a string and handles escape characters.
    fn parse_string(&self, raw: &str) -> Result<String> {
        let inner = &raw[1..raw.len() - 1];
        if !inner.contains('\\') {
            return Ok(inner.to_owned());
        }
        let mut iter = inner.chars();
        let mut string = String::with_capacity(inner.len());
        while let Some(c) = iter.next() {
            if c != '\\' {
                string.push(c);
                continue;
            }
            let c = match iter.next() {
                Some('n') => '\n',
                Some('r') => '\r',
                Some('t') => '\t',
                Some('\\') => '\\',
                Some('"') => '"',
                Some('\'') => '\'',
                _ => {
                    return Err(Error::eval(format!(
                        "unknown escape character in `{}`",
                        self.source.trim()
                    )));
                }
            };
            string.push(c);
        }
        Ok(string)
    }

    fn skip_separators(&mut self) {
        while let Some((Token::Semicolon | Token::Newline, _)) = self.peek() {
            self.next();
        }
    }

    /// Expects the given token and returns its text.
    fn expect(&mut self, exp: Token) -> Result<&'a str> {
        let source = self.source;
        match self.parse()? {
            (tk, span) if tk == exp => Ok(&source[span]),
            (tk, _) => Err(Error::eval(format!(
                "expected {}, found {} in `{}`",
                exp.human(),
                tk.human(),
                self.source.trim()
            ))),
        }
    }

    /// Parses any token.
    fn parse(&mut self) -> Result<(Token, Span)> {
        match self.next() {
            Some(next) => Ok(next),
            None => Err(Error::eval(format!(
                "unexpected end of fragment `{}`",
                self.source.trim()
            ))),
        }
    }

    fn peek(&self) -> Option<(Token, Span)> {
        self.tokens.get(self.cursor).copied()
    }

    fn next(&mut self) -> Option<(Token, Span)> {
        let next = self.peek();
        if next.is_some() {
            self.cursor += 1;
        }
        next
    }

    fn err_unexpected_token(&self, tk: Token) -> Error {
        Error::eval(format!(
            "unexpected {} in `{}`",
            tk.human(),
            self.source.trim()
        ))
    }
}
