//! Preprocessing applied to the template text before it is tokenized.

use crate::types::syntax::{Kind, Syntax};

/// Normalize the template text.
///
/// - `\r\n` and `\r` line endings become `\n`.
/// - Spaces and tabs are trimmed from both ends of every line.
/// - Spaces and tabs directly before `<%_` and directly after `_%>` are
///   removed.
pub fn normalize(source: &str, syntax: &Syntax) -> String {
    let unified = source.replace("\r\n", "\n").replace('\r', "\n");

    let mut text = String::with_capacity(unified.len());
    for (i, line) in unified.split('\n').enumerate() {
        if i > 0 {
            text.push('\n');
        }
        text.push_str(line.trim_matches(is_blank));
    }

    let text = slurp_before(&text, syntax.pattern(Kind::OpenEvalTrim));
    slurp_after(&text, syntax.pattern(Kind::CloseUnderscoreTrim))
}

/// Removes the blanks preceding every occurrence of `pat`.
fn slurp_before(text: &str, pat: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (i, _) in text.match_indices(pat) {
        out.push_str(text[last..i].trim_end_matches(is_blank));
        last = i;
    }
    out.push_str(&text[last..]);
    out
}

/// Removes the blanks following every occurrence of `pat`.
fn slurp_after(text: &str, pat: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (i, _) in text.match_indices(pat) {
        if i < last {
            continue;
        }
        let j = i + pat.len();
        out.push_str(&text[last..j]);
        last = j + (text[j..].len() - text[j..].trim_start_matches(is_blank).len());
    }
    out.push_str(&text[last..]);
    out
}

/// Spaces and tabs, line breaks are never trimmed here.
fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t')
}
