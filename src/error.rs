use std::cmp::max;
use std::error::Error as _;
use std::fmt;
use std::io;

use crate::types::span::Span;

/// An error that can occur during template compilation or rendering.
pub struct Error {
    kind: ErrorKind,
    msg: String,
    pretty: Option<ErrorPretty>,
    trace: Option<Trace>,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The template could not be compiled, e.g. a tag was never closed.
    Syntax,
    /// A fragment failed while it was being evaluated.
    Eval,
    /// A value could not be formatted.
    Format,
    /// The render context could not be serialized.
    Serialize,
    /// Writing the rendered output failed.
    Io,
    /// No template is stored in the engine under the requested name.
    NotFound,
}

/// The template excerpt a syntax error points into.
struct ErrorPretty {
    source: String,
    span: Span,
}

/// Debug context added to render errors when debug scaffolding is enabled.
struct Trace {
    filename: String,
    line: usize,
    context: String,
}

impl Error {
    /// Construct a new evaluation error.
    ///
    /// This is the error custom [`Evaluator`][crate::Evaluator]s should
    /// return when a fragment cannot be executed.
    pub fn eval(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Eval, msg)
    }

    pub(crate) fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
            pretty: None,
            trace: None,
            source: None,
        }
    }

    pub(crate) fn syntax(msg: impl Into<String>, source: &str, span: impl Into<Span>) -> Self {
        Self {
            pretty: Some(ErrorPretty {
                source: source.to_owned(),
                span: span.into(),
            }),
            ..Self::new(ErrorKind::Syntax, msg)
        }
    }

    pub(crate) fn format(err: crate::fmt::Error) -> Self {
        let msg = err
            .into_message()
            .unwrap_or_else(|| String::from("failed to format value"));
        Self::new(ErrorKind::Format, msg)
    }

    /// Attach the debug trace of a failed render.
    ///
    /// An error is only ever traced once, the innermost trace wins.
    pub(crate) fn with_trace(mut self, filename: &str, line: usize, context: String) -> Self {
        if self.trace.is_none() {
            self.trace = Some(Trace {
                filename: filename.to_owned(),
                line,
                context,
            });
        }
        self
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the template line the error occurred on.
    ///
    /// Only available for syntax errors and for render errors of templates
    /// compiled with debug scaffolding enabled.
    pub fn line(&self) -> Option<usize> {
        match (&self.trace, &self.pretty) {
            (Some(trace), _) => Some(trace.line),
            (None, Some(ErrorPretty { source, span })) => {
                Some(source[..span.m].matches('\n').count() + 1)
            }
            (None, None) => None,
        }
    }

    /// Returns the filename label of the template that failed to render.
    pub fn filename(&self) -> Option<&str> {
        self.trace.as_ref().map(|t| t.filename.as_str())
    }

    /// Returns the error message without any template context.
    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| &**e as &(dyn std::error::Error + 'static))
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self {
            source: Some(Box::new(err)),
            ..Self::new(ErrorKind::Io, "failed to write rendered output")
        }
    }
}

impl From<crate::fmt::Error> for Error {
    fn from(err: crate::fmt::Error) -> Self {
        Self::format(err)
    }
}

impl From<fmt::Error> for Error {
    fn from(err: fmt::Error) -> Self {
        Self::format(err.into())
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self {
            source: Some(Box::new(err)),
            ..Self::new(ErrorKind::Serialize, "failed to serialize render context")
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:#}")
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(Trace {
            filename,
            line,
            context,
        }) = &self.trace
        {
            write!(f, "{filename}:{line}\n{context}\n\n")?;
        }
        match &self.pretty {
            Some(ErrorPretty { source, span }) => {
                if f.alternate() {
                    fmt_pretty(&self.msg, source, *span, f)
                } else {
                    write!(f, "{} between bytes {} and {}", self.msg, span.m, span.n)
                }
            }
            None => {
                write!(f, "{}", self.msg)?;
                if let Some(err) = self.source() {
                    write!(f, ": {err}")?;
                }
                Ok(())
            }
        }
    }
}

fn fmt_pretty(msg: &str, source: &str, span: Span, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let lines: Vec<_> = source.split_terminator('\n').collect();
    let (line, col) = to_line_col(&lines, span.m);
    let width = max(1, str_width(&source[span]));
    let code = lines.get(line).or_else(|| lines.last()).copied().unwrap_or("");

    let num = (line + 1).to_string();
    let pad = num.len();
    let pipe = "|";
    let underline = "^".repeat(width);

    write!(
        f,
        "\n \
        {0:pad$} {pipe}\n \
        {num:>} {pipe} {code}\n \
        {0:pad$} {pipe} {underline:>width$} {msg}\n",
        "",
        pad = pad,
        pipe = pipe,
        num = num,
        code = code,
        underline = underline,
        width = col + width,
        msg = msg
    )
}

fn to_line_col(lines: &[&str], offset: usize) -> (usize, usize) {
    let mut n = 0;
    for (i, line) in lines.iter().enumerate() {
        let len = line.len() + 1;
        if n + len > offset {
            return (i, str_width(&line[..offset - n]));
        }
        n += len;
    }
    (lines.len(), lines.last().map(|l| str_width(l)).unwrap_or(0))
}

#[cfg(feature = "unicode")]
fn str_width(s: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(s)
}

#[cfg(not(feature = "unicode"))]
fn str_width(s: &str) -> usize {
    s.chars().count()
}
