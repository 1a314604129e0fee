//! Compile the template into an instruction list.
//!
//! This process has three stages:
//! - The source text is normalized, see [`text::normalize`].
//! - The lexer chunks the normalized text into literal text and delimiters.
//! - The compiler walks the tokens with a small mode state machine and
//!   constructs the instruction list.

mod lex;
mod search;
mod text;

pub use crate::compile::search::Searcher;

use crate::compile::lex::Token;
use crate::types::options::Options;
use crate::types::program::{Fragment, Instr, Template};
use crate::types::span::Span;
use crate::types::syntax::Kind;
use crate::{Error, Result};

/// Compile a template into an instruction list.
pub fn template(searcher: &Searcher, options: &Options, source: &str) -> Result<Template> {
    let source = text::normalize(source, &options.syntax);
    let tokens = lex::tokenize(searcher, &source);
    check_close_tags(&source, &tokens)?;

    let mut compiler = Compiler::new(options, &source);
    for &(token, span) in &tokens {
        compiler.scan(token, span);
    }
    let Compiler { instrs, name, .. } = compiler;

    tracing::debug!(
        tokens = tokens.len(),
        instrs = instrs.len(),
        name = name.as_deref(),
        "compiled template"
    );

    Ok(Template {
        source,
        instrs,
        name,
    })
}

/// Every open tag except the literal one must be closed exactly two tokens
/// later, i.e. `<%=`, then the fragment, then the close tag.
fn check_close_tags(source: &str, tokens: &[(Token, Span)]) -> Result<()> {
    for (i, &(token, span)) in tokens.iter().enumerate() {
        let Token::Tag(kind) = token else {
            continue;
        };
        if !kind.requires_close() {
            continue;
        }
        match tokens.get(i + 2) {
            Some((Token::Tag(k), _)) if k.is_close() => {}
            _ => {
                let msg = format!(
                    "could not find matching close tag for \"{}\"",
                    &source[span]
                );
                return Err(Error::syntax(msg, source, span));
            }
        }
    }
    Ok(())
}

/// The kind of region the compiler is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Eval,
    Escaped,
    Raw,
    Comment,
    Literal,
}

/// A compiler that constructs an instruction list from a token stream.
struct Compiler<'a> {
    options: &'a Options,

    /// The normalized template source.
    source: &'a str,

    /// The region we are in, `None` outside of any tag.
    mode: Option<Mode>,

    /// Whether the next literal output should drop one leading line break.
    truncate: bool,

    /// The template line the next token starts on.
    line: usize,

    /// The name captured from the first `Template Name:` comment.
    name: Option<String>,

    instrs: Vec<Instr>,
}

impl<'a> Compiler<'a> {
    fn new(options: &'a Options, source: &'a str) -> Self {
        Self {
            options,
            source,
            mode: None,
            truncate: false,
            line: 1,
            name: None,
            instrs: Vec::new(),
        }
    }

    fn scan(&mut self, token: Token, span: Span) {
        let source = self.source;
        let text = &source[span];
        match token {
            Token::Tag(Kind::OpenEval | Kind::OpenEvalTrim) => {
                self.mode = Some(Mode::Eval);
            }
            Token::Tag(Kind::OpenEscaped) => {
                self.mode = Some(Mode::Escaped);
            }
            Token::Tag(Kind::OpenRaw) => {
                self.mode = Some(Mode::Raw);
            }
            Token::Tag(Kind::OpenComment) => {
                self.mode = Some(Mode::Comment);
            }
            Token::Tag(Kind::OpenLiteral) => {
                self.mode = Some(Mode::Literal);
                let open = self.options.syntax.open_tag().to_owned();
                self.push(Instr::EmitLiteral(open));
            }
            Token::Tag(Kind::CloseLiteral) => {
                self.mode = Some(Mode::Literal);
                let close = self.options.syntax.close_tag().to_owned();
                self.push(Instr::EmitLiteral(close));
            }
            Token::Tag(kind @ (Kind::Close | Kind::CloseDashTrim | Kind::CloseUnderscoreTrim)) => {
                if self.mode == Some(Mode::Literal) {
                    self.add_output(text);
                }
                self.mode = None;
                self.truncate = kind.is_trim_close();
            }
            Token::Text => {
                match self.mode {
                    None | Some(Mode::Literal) => self.add_output(text),
                    Some(Mode::Eval) => {
                        let fragment = self.fragment(text, span);
                        self.push(Instr::Exec(fragment));
                    }
                    Some(Mode::Escaped) => {
                        let fragment = self.fragment(strip_semi(text), span);
                        self.push(Instr::EmitEscaped(fragment));
                    }
                    Some(Mode::Raw) => {
                        let fragment = self.fragment(strip_semi(text), span);
                        self.push(Instr::EmitRaw(fragment));
                    }
                    Some(Mode::Comment) => self.maybe_template_name(text),
                }
                self.advance_line(text);
            }
        }
    }

    /// Append literal text, honouring a pending truncation.
    fn add_output(&mut self, text: &str) {
        let mut text = text;
        if self.truncate {
            text = text
                .strip_prefix("\r\n")
                .or_else(|| text.strip_prefix('\r'))
                .or_else(|| text.strip_prefix('\n'))
                .unwrap_or(text);
            self.truncate = false;
        }
        if !text.is_empty() {
            self.push(Instr::EmitLiteral(text.to_owned()));
        }
    }

    /// Build a fragment from the script code inside a tag.
    ///
    /// A `//` comment on the last line would swallow whatever code follows
    /// it in the generated function, so a line break is appended.
    fn fragment(&self, code: &str, span: Span) -> Fragment {
        let mut code = code.to_owned();
        if let Some(i) = code.rfind("//") {
            if code.rfind('\n').map_or(true, |j| i > j) {
                code.push('\n');
            }
        }
        Fragment { code, span }
    }

    fn maybe_template_name(&mut self, text: &str) {
        for line in text.lines() {
            let Some(name) = parse_template_name(line) else {
                continue;
            };
            match &self.name {
                None => self.name = Some(name.to_owned()),
                Some(first) => {
                    tracing::debug!(
                        first = %first,
                        ignored = name,
                        "ignoring duplicate template name"
                    );
                }
            }
        }
    }

    fn advance_line(&mut self, text: &str) {
        let n = text.matches('\n').count();
        if n > 0 && self.options.compile_debug {
            self.line += n;
            self.push(Instr::Line(self.line));
        }
    }

    fn push(&mut self, instr: Instr) {
        self.instrs.push(instr);
    }
}

/// Trim the code of an output tag and remove one trailing `;`.
fn strip_semi(code: &str) -> &str {
    let code = code.trim();
    match code.strip_suffix(';') {
        Some(code) => code.trim_end(),
        None => code,
    }
}

/// Parses a `Template Name: <ident>` line, the whole trimmed line must match.
fn parse_template_name(line: &str) -> Option<&str> {
    let name = line.trim().strip_prefix("Template Name: ")?;
    let valid = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    valid.then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::syntax::Syntax;

    #[test]
    fn compile_text_only() {
        let t = compile("Hello\nWorld", &Options::default()).unwrap();
        assert_eq!(
            t.instrs,
            [Instr::EmitLiteral("Hello\nWorld".into()), Instr::Line(2)]
        );
    }

    #[test]
    fn compile_every_mode() {
        let options = Options::builder().compile_debug(false).build();
        let t = compile("a<% x = 1 %>b<%= x; %>c<%- y %>d<%# note %>e", &options).unwrap();
        let codes: Vec<_> = t
            .instrs
            .iter()
            .map(|instr| match instr {
                Instr::EmitLiteral(s) => format!("lit:{s}"),
                Instr::EmitEscaped(f) => format!("esc:{}", f.code),
                Instr::EmitRaw(f) => format!("raw:{}", f.code),
                Instr::Exec(f) => format!("exec:{}", f.code),
                Instr::Line(n) => format!("line:{n}"),
            })
            .collect();
        assert_eq!(
            codes,
            [
                "lit:a",
                "exec: x = 1 ",
                "lit:b",
                "esc:x",
                "lit:c",
                "raw:y",
                "lit:d",
                "lit:e"
            ]
        );
    }

    #[test]
    fn compile_fragment_span() {
        let t = compile("ab<%= x %>", &Options::default()).unwrap();
        match &t.instrs[1] {
            Instr::EmitEscaped(f) => assert_eq!(&t.source.as_str()[f.span], " x "),
            instr => panic!("unexpected instruction {instr:?}"),
        }
    }

    #[test]
    fn compile_trailing_line_comment() {
        let t = compile("<% x = 1 // set %>", &Options::default()).unwrap();
        assert_eq!(
            t.instrs,
            [Instr::Exec(Fragment {
                code: " x = 1 // set \n".into(),
                span: Span::from(2..16),
            })]
        );
    }

    #[test]
    fn compile_line_comment_before_line_break() {
        let options = Options::builder().compile_debug(false).build();
        let t = compile("<% // set\nx = 1 %>", &options).unwrap();
        assert_eq!(
            t.instrs,
            [Instr::Exec(Fragment {
                code: " // set\nx = 1 ".into(),
                span: Span::from(2..16),
            })]
        );
    }

    #[test]
    fn compile_truncate_dash() {
        let t = compile("<% x = 1 -%>\nHello", &Options::default()).unwrap();
        assert_eq!(
            t.instrs[1..],
            [Instr::EmitLiteral("Hello".into()), Instr::Line(2)]
        );
    }

    #[test]
    fn compile_truncate_strips_only_one_break() {
        let options = Options::builder().compile_debug(false).build();
        let t = compile("<% x = 1 -%>\n\nHello", &options).unwrap();
        assert_eq!(t.instrs[1..], [Instr::EmitLiteral("\nHello".into())]);
    }

    #[test]
    fn compile_literal_open() {
        let options = Options::builder().compile_debug(false).build();
        let t = compile("a <%% b %> c", &options).unwrap();
        assert_eq!(
            t.instrs,
            [
                Instr::EmitLiteral("a ".into()),
                Instr::EmitLiteral("<%".into()),
                Instr::EmitLiteral(" b ".into()),
                Instr::EmitLiteral("%>".into()),
                Instr::EmitLiteral(" c".into()),
            ]
        );
    }

    #[test]
    fn compile_literal_close() {
        let options = Options::builder().compile_debug(false).build();
        let t = compile("a %%> b", &options).unwrap();
        assert_eq!(
            t.instrs,
            [
                Instr::EmitLiteral("a ".into()),
                Instr::EmitLiteral("%>".into()),
                Instr::EmitLiteral(" b".into()),
            ]
        );
    }

    #[test]
    fn compile_stray_close_is_dropped() {
        let options = Options::builder().compile_debug(false).build();
        let t = compile("a %> b", &options).unwrap();
        assert_eq!(
            t.instrs,
            [
                Instr::EmitLiteral("a ".into()),
                Instr::EmitLiteral(" b".into()),
            ]
        );
    }

    #[test]
    fn compile_template_name_first_wins() {
        let source = "<%# Template Name: first %><%# Template Name: second %>";
        let t = compile(source, &Options::default()).unwrap();
        assert_eq!(t.name.as_deref(), Some("first"));
        assert!(t.instrs.is_empty());
    }

    #[test]
    fn compile_template_name_line_wise() {
        let source = "<%#\n  A greeting\n  Template Name: greet-2_x\n%>";
        let t = compile(source, &Options::default()).unwrap();
        assert_eq!(t.name.as_deref(), Some("greet-2_x"));
    }

    #[test]
    fn compile_template_name_invalid() {
        for source in [
            "<%# Template Name: %>",
            "<%# Template Name: a b %>",
            "<%# The Template Name: a %>",
            "<%= 'Template Name: a' %>",
        ] {
            let t = compile(source, &Options::default()).unwrap();
            assert_eq!(t.name, None, "{source}");
        }
    }

    #[test]
    fn compile_line_counting_through_fragments() {
        let t = compile("a\n<% x = 1\ny = 2 %>\nb", &Options::default()).unwrap();
        let lines: Vec<_> = t
            .instrs
            .iter()
            .filter_map(|instr| match instr {
                Instr::Line(n) => Some(*n),
                _ => None,
            })
            .collect();
        assert_eq!(lines, [2, 3, 4]);
    }

    #[test]
    fn compile_no_lines_without_debug() {
        let options = Options::builder().compile_debug(false).build();
        let t = compile("a\n\nb", &options).unwrap();
        assert_eq!(t.instrs, [Instr::EmitLiteral("a\n\nb".into())]);
    }

    #[test]
    fn compile_err_unclosed() {
        let err = compile("<% a = 1", &Options::default()).unwrap_err();
        assert_eq!(
            err.message(),
            "could not find matching close tag for \"<%\""
        );
    }

    #[test]
    fn compile_err_close_too_far() {
        let err = compile("x <%= a <%= b %>", &Options::default()).unwrap_err();
        assert_eq!(
            format!("{err:#}"),
            r#"
   |
 1 | x <%= a <%= b %>
   |   ^^^ could not find matching close tag for "<%="
"#
        );
    }

    #[test]
    fn compile_err_literal_close_does_not_match() {
        let err = compile("<%= a %%>", &Options::default()).unwrap_err();
        assert_eq!(
            err.message(),
            "could not find matching close tag for \"<%=\""
        );
    }

    #[test]
    fn compile_custom_syntax() {
        let syntax = Syntax::builder().open("{").close("}").delimiter("?").build();
        let options = Options::builder()
            .syntax(syntax)
            .compile_debug(false)
            .build();
        let t = compile("{?= a ?} {?? b", &options).unwrap();
        assert_eq!(
            t.instrs,
            [
                Instr::EmitEscaped(Fragment {
                    code: "a".into(),
                    span: Span::from(3..6),
                }),
                Instr::EmitLiteral(" ".into()),
                Instr::EmitLiteral("{?".into()),
                Instr::EmitLiteral(" b".into()),
            ]
        );
    }

    #[test]
    fn strip_semi_output_code() {
        assert_eq!(strip_semi(" x "), "x");
        assert_eq!(strip_semi(" x; "), "x");
        assert_eq!(strip_semi(" x ; "), "x");
        assert_eq!(strip_semi(" x;; "), "x;");
    }

    #[track_caller]
    fn compile(source: &str, options: &Options) -> Result<Template> {
        let searcher = Searcher::new(&options.syntax);
        template(&searcher, options, source)
    }
}
