//! Finds delimiters in template text.
//!
//! All delimiter variants are joined into a single alternation regular
//! expression. The regex engine uses leftmost-first semantics, so the
//! alternatives are ordered longest first which makes the leftmost match
//! also the longest one, e.g. `<%=` is preferred over `<%`.

use regex::Regex;

use crate::types::syntax::{Kind, Syntax};

#[derive(Debug, Clone)]
pub struct Searcher {
    regex: Regex,
    patterns: Vec<(Kind, String)>,
}

impl Searcher {
    pub fn new(syntax: &Syntax) -> Self {
        let mut patterns = syntax.patterns.clone();
        // Stable, so equal length patterns keep their declaration order.
        patterns.sort_by(|(_, a), (_, b)| b.len().cmp(&a.len()));
        let alternation = patterns
            .iter()
            .map(|(_, p)| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        let regex = match Regex::new(&alternation) {
            Ok(regex) => regex,
            Err(err) => panic!("delimiter patterns must form a valid regex: {err}"),
        };
        Self { regex, patterns }
    }

    /// Returns the next delimiter at or after `at`.
    pub fn find_at(&self, haystack: &str, at: usize) -> Option<(Kind, usize, usize)> {
        let m = self.regex.find_at(haystack, at)?;
        let kind = self
            .patterns
            .iter()
            .find(|(_, p)| p == m.as_str())
            .map(|(k, _)| *k)?;
        Some((kind, m.start(), m.end()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn searcher_prefers_longest() {
        let s = Searcher::new(&Syntax::default());
        assert_eq!(s.find_at("a <%= b", 0), Some((Kind::OpenEscaped, 2, 5)));
        assert_eq!(s.find_at("a <%% b", 0), Some((Kind::OpenLiteral, 2, 5)));
        assert_eq!(s.find_at("a -%> b", 0), Some((Kind::CloseDashTrim, 2, 5)));
        assert_eq!(s.find_at("a %%> b", 0), Some((Kind::CloseLiteral, 2, 5)));
        assert_eq!(s.find_at("a <% b", 0), Some((Kind::OpenEval, 2, 4)));
    }

    #[test]
    fn searcher_find_at_offset() {
        let s = Searcher::new(&Syntax::default());
        assert_eq!(s.find_at("<% x %>", 2), Some((Kind::Close, 5, 7)));
        assert_eq!(s.find_at("<% x %>", 7), None);
    }

    #[test]
    fn searcher_escapes_regex_characters() {
        let syntax = Syntax::builder().open("(").close(")").delimiter("?").build();
        let s = Searcher::new(&syntax);
        assert_eq!(s.find_at("a (?= b ?)", 0), Some((Kind::OpenEscaped, 2, 5)));
        assert_eq!(s.find_at("a (?= b ?)", 5), Some((Kind::Close, 8, 10)));
        assert_eq!(s.find_at("a.b*c", 0), None);
    }

    #[test]
    fn searcher_alt_escape_sign() {
        let syntax = Syntax::builder().alt_escape_sign(true).build();
        let s = Searcher::new(&syntax);
        assert_eq!(s.find_at("<%- x", 0), Some((Kind::OpenEscaped, 0, 3)));
        assert_eq!(s.find_at("<%= x", 0), Some((Kind::OpenRaw, 0, 3)));
    }
}
