//! Types for value formatters.
//!
//! Value formatters decide how the value of an output tag is written to the
//! rendered template. Raw output tags (`<%- value %>`) always use [`default`],
//! escaped output tags (`<%= value %>`) use the escape formatter configured
//! with [`OptionsBuilder::escape`][crate::OptionsBuilder::escape], which is
//! [`escape_html`] unless overridden.
//!
//! All formatter functions must have the following signature.
//!
//! ```text
//! use scriptlet::{Value, fmt};
//! Fn(&mut fmt::Formatter<'_>, &Value) -> fmt::Result;
//! ```
//!
//! Since [`Error`] implements `From<String>` and `From<&str>` it is possible
//! to return custom messages from formatter functions. You can also easily
//! propagate the standard library [`std::fmt::Error`].
//!
//! # Examples
//!
//! ### Escape for a shell
//!
//! ```
//! use std::fmt::Write;
//! use scriptlet::{fmt, Options, Value};
//!
//! fn escape_quotes(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
//!     match value {
//!         Value::String(s) => write!(f, "'{}'", s.replace('\'', "'\\''"))?,
//!         v => fmt::default(f, v)?,
//!     };
//!     Ok(())
//! }
//!
//! let options = Options::builder().escape(escape_quotes).build();
//! ```

use std::fmt;
use std::fmt::Write;
use std::io;

use crate::Value;

/// A formatter function or closure.
pub(crate) type FormatFn = dyn Fn(&mut Formatter<'_>, &Value) -> Result + Sync + Send + 'static;

/// The output a template is rendered into.
///
/// Implements [`std::fmt::Write`], so `write!` and `f.write_str(..)` work as
/// they do with [`std::fmt::Formatter`].
pub struct Formatter<'a> {
    out: &'a mut (dyn fmt::Write + 'a),
}

/// The result type returned from a formatter function.
pub type Result = std::result::Result<(), Error>;

/// The error type returned from a formatter function.
///
/// Carries an optional message, a bare [`std::fmt::Error`] has none.
#[derive(Debug, Clone)]
pub struct Error {
    msg: Option<String>,
}

/// Adapts an [`io::Write`] to [`fmt::Write`], keeping the first I/O error
/// since [`fmt::Error`] cannot carry it.
pub(crate) struct IoAdapter<W> {
    inner: W,
    error: Option<io::Error>,
}

impl<'a> Formatter<'a> {
    pub(crate) fn with_string(out: &'a mut String) -> Self {
        Self { out }
    }

    pub(crate) fn with_io<W>(out: &'a mut IoAdapter<W>) -> Self
    where
        W: io::Write,
    {
        Self { out }
    }
}

impl fmt::Write for Formatter<'_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.write_str(s)
    }

    #[inline]
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        self.out.write_fmt(args)
    }
}

impl Error {
    pub(crate) fn into_message(self) -> Option<String> {
        self.msg
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.msg.as_deref().unwrap_or("format error"))
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Self::from(msg.to_owned())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Self { msg: Some(msg) }
    }
}

impl From<fmt::Error> for Error {
    fn from(_: fmt::Error) -> Self {
        Self { msg: None }
    }
}

impl<W> IoAdapter<W>
where
    W: io::Write,
{
    pub(crate) fn new(inner: W) -> Self {
        Self { inner, error: None }
    }

    /// Returns the I/O error that interrupted rendering, if any.
    pub(crate) fn into_error(self) -> Option<io::Error> {
        self.error
    }
}

impl<W> fmt::Write for IoAdapter<W>
where
    W: io::Write,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.error.is_some() {
            return Err(fmt::Error);
        }
        match self.inner.write_all(s.as_bytes()) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.error = Some(err);
                Err(fmt::Error)
            }
        }
    }
}

/// The default value formatter, used for raw output tags.
///
/// Values are formatted as follows:
/// - [`Value::None`]: empty string
/// - [`Value::Bool`]: `true` or `false`
/// - [`Value::Integer`]: the integer formatted using [`Display`][std::fmt::Display]
/// - [`Value::Float`]: the float formatted using [`Display`][std::fmt::Display]
/// - [`Value::String`]: the string, unescaped
///
/// Errors if the value is a [`Value::List`] or [`Value::Map`].
#[inline]
pub fn default(f: &mut Formatter<'_>, value: &Value) -> Result {
    match value {
        Value::None => {}
        Value::Bool(b) => write!(f, "{b}")?,
        Value::Integer(n) => write!(f, "{n}")?,
        Value::Float(n) => write!(f, "{n}")?,
        Value::String(s) => f.write_str(s)?,
        value => {
            return Err(Error::from(format!(
                "expression evaluated to unformattable type {}",
                value.human()
            )));
        }
    }
    Ok(())
}

/// The default escape formatter, used for escaped output tags.
///
/// Strings have `&`, `<`, `>`, `"` and `'` replaced by HTML entities, all
/// other values are formatted using [`default`].
pub fn escape_html(f: &mut Formatter<'_>, value: &Value) -> Result {
    let s = match value {
        Value::String(s) => s,
        value => return default(f, value),
    };

    let mut last = 0;
    for (i, byte) in s.bytes().enumerate() {
        let entity = match byte {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&#34;",
            b'\'' => "&#39;",
            _ => continue,
        };
        f.write_str(&s[last..i])?;
        f.write_str(entity)?;
        last = i + 1;
    }
    f.write_str(&s[last..])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_entities() {
        let mut s = String::new();
        let mut f = Formatter::with_string(&mut s);
        escape_html(&mut f, &Value::from(r#"<a href="x">Tom & 'Jerry'</a>"#)).unwrap();
        assert_eq!(
            s,
            "&lt;a href=&#34;x&#34;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn escape_html_non_string() {
        let mut s = String::new();
        let mut f = Formatter::with_string(&mut s);
        escape_html(&mut f, &Value::Integer(7)).unwrap();
        escape_html(&mut f, &Value::None).unwrap();
        escape_html(&mut f, &Value::Bool(false)).unwrap();
        assert_eq!(s, "7false");
    }

    #[test]
    fn default_list_errors() {
        let mut s = String::new();
        let mut f = Formatter::with_string(&mut s);
        let err = default(&mut f, &Value::from(vec![1, 2])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "expression evaluated to unformattable type list"
        );
    }
}
