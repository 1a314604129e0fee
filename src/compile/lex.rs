use crate::compile::search::Searcher;
use crate::types::span::Span;
use crate::types::syntax::Kind;

/// A lexer that chunks the preprocessed template source into literal text
/// and delimiter tokens.
///
/// The lexer is implemented as an iterator, but the compiler needs to look
/// two tokens ahead so [`tokenize`] collects everything up front.
pub struct Lexer<'a> {
    /// The syntax searcher.
    searcher: &'a Searcher,

    /// The preprocessed template source.
    source: &'a str,

    /// A cursor over the template source.
    cursor: usize,

    /// A buffer to store the next token.
    next: Option<(Token, Span)>,
}

/// The unit yielded by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Anything that is not a delimiter: literal text or fragment code.
    Text,
    /// One of the delimiter variants, e.g. `<%=` or `-%>`.
    Tag(Kind),
}

/// Split the template source into an ordered sequence of tokens.
pub fn tokenize(searcher: &Searcher, source: &str) -> Vec<(Token, Span)> {
    Lexer::new(searcher, source).collect()
}

impl<'a> Lexer<'a> {
    /// Construct a new lexer.
    pub fn new(searcher: &'a Searcher, source: &'a str) -> Self {
        Self {
            searcher,
            source,
            cursor: 0,
            next: None,
        }
    }

    fn lex(&mut self) -> Option<(Token, Span)> {
        if let Some(next) = self.next.take() {
            return Some(next);
        }

        // Find the next delimiter from the cursor `i`. The text between
        // `i` and the start of the delimiter `j` is emitted first.
        //
        // xxxxxxx<%=xxxxxxxxx
        //    ^   ^  ^
        //    i   j  k

        let i = self.cursor;
        if i >= self.source.len() {
            return None;
        }

        match self.searcher.find_at(self.source, i) {
            Some((kind, j, k)) => {
                self.cursor = k;
                let tag = (Token::Tag(kind), Span::from(j..k));
                if i == j {
                    Some(tag)
                } else {
                    self.next = Some(tag);
                    Some((Token::Text, Span::from(i..j)))
                }
            }
            None => {
                let j = self.source.len();
                self.cursor = j;
                Some((Token::Text, Span::from(i..j)))
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = (Token, Span);

    fn next(&mut self) -> Option<Self::Item> {
        self.lex()
    }
}
