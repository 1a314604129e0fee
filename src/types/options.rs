use std::fmt;
use std::sync::Arc;

use crate::fmt::{FormatFn, Formatter};
use crate::types::syntax::Syntax;
use crate::Value;

/// The compiler configuration.
///
/// Use [`Options::default()`] for the defaults and [`Options::builder()`] to
/// customize. Options are validated once when built and are immutable
/// afterwards.
#[derive(Clone)]
pub struct Options {
    pub(crate) syntax: Syntax,
    pub(crate) escape: Arc<FormatFn>,
    pub(crate) locals_name: String,
    pub(crate) use_with: bool,
    pub(crate) strict: bool,
    pub(crate) compile_debug: bool,
    pub(crate) output_function_name: Option<String>,
    pub(crate) filename: Option<String>,
}

/// A builder for the compiler configuration.
///
/// This struct is typically created using [`Options::builder()`].
#[derive(Clone)]
pub struct OptionsBuilder {
    syntax: Syntax,
    escape: Arc<FormatFn>,
    locals_name: String,
    use_with: Option<bool>,
    strict: bool,
    compile_debug: bool,
    output_function_name: Option<String>,
    filename: Option<String>,
}

impl Default for Options {
    /// Returns the default configuration.
    ///
    /// This is equivalent to the following.
    /// ```
    /// use scriptlet::{Options, Syntax};
    ///
    /// let options = Options::builder()
    ///     .syntax(Syntax::default())
    ///     .locals_name("locals")
    ///     .compile_debug(true)
    ///     .build();
    /// assert!(options.use_with());
    /// ```
    #[inline]
    fn default() -> Self {
        Options::builder().build()
    }
}

impl Options {
    /// Create a new options builder.
    #[inline]
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::new()
    }

    /// The delimiter configuration.
    pub fn syntax(&self) -> &Syntax {
        &self.syntax
    }

    /// The identifier the render context is bound to.
    pub fn locals_name(&self) -> &str {
        &self.locals_name
    }

    /// Whether context fields are exposed as bare identifiers.
    pub fn use_with(&self) -> bool {
        self.use_with
    }

    /// Whether a strict-execution directive is emitted.
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Whether line tracking and error rethrow scaffolding is emitted.
    pub fn compile_debug(&self) -> bool {
        self.compile_debug
    }

    /// The alias bound to the append operation, if any.
    pub fn output_function_name(&self) -> Option<&str> {
        self.output_function_name.as_deref()
    }

    /// The diagnostic filename label, if any.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub(crate) fn escape(&self, f: &mut Formatter<'_>, value: &Value) -> crate::fmt::Result {
        (self.escape)(f, value)
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("syntax", &self.syntax)
            .field("locals_name", &self.locals_name)
            .field("use_with", &self.use_with)
            .field("strict", &self.strict)
            .field("compile_debug", &self.compile_debug)
            .field("output_function_name", &self.output_function_name)
            .field("filename", &self.filename)
            .finish_non_exhaustive()
    }
}

impl OptionsBuilder {
    /// Creates a new options builder.
    #[inline]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            syntax: Syntax::default(),
            escape: Arc::new(crate::fmt::escape_html),
            locals_name: String::from("locals"),
            use_with: None,
            strict: false,
            compile_debug: true,
            output_function_name: None,
            filename: None,
        }
    }

    /// Set the delimiter configuration.
    #[inline]
    pub fn syntax(&mut self, syntax: Syntax) -> &mut Self {
        self.syntax = syntax;
        self
    }

    /// Set the formatter used for escaped output tags.
    ///
    /// Defaults to [`escape_html`][crate::fmt::escape_html].
    #[inline]
    pub fn escape<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut Formatter<'_>, &Value) -> crate::fmt::Result + Sync + Send + 'static,
    {
        self.escape = Arc::new(f);
        self
    }

    /// Set the identifier the render context is bound to.
    ///
    /// # Panics
    ///
    /// If the name is empty.
    #[inline]
    pub fn locals_name(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        assert!(!name.is_empty());
        self.locals_name = name;
        self
    }

    /// Expose the fields of the render context as bare identifiers.
    ///
    /// Defaults to `true` unless [`strict`][OptionsBuilder::strict] is set.
    #[inline]
    pub fn use_with(&mut self, yes: bool) -> &mut Self {
        self.use_with = Some(yes);
        self
    }

    /// Emit a strict-execution directive. This always disables `use_with`.
    #[inline]
    pub fn strict(&mut self, yes: bool) -> &mut Self {
        self.strict = yes;
        self
    }

    /// Emit line tracking and error rethrow scaffolding. Defaults to `true`.
    #[inline]
    pub fn compile_debug(&mut self, yes: bool) -> &mut Self {
        self.compile_debug = yes;
        self
    }

    /// Bind an alias to the append operation, e.g. `echo`.
    ///
    /// # Panics
    ///
    /// If the name is empty.
    #[inline]
    pub fn output_function_name(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        assert!(!name.is_empty());
        self.output_function_name = Some(name);
        self
    }

    /// Set the filename label used in render error messages.
    #[inline]
    pub fn filename(&mut self, filename: impl Into<String>) -> &mut Self {
        self.filename = Some(filename.into());
        self
    }

    /// Builds the options.
    pub fn build(&self) -> Options {
        let use_with = !self.strict && self.use_with.unwrap_or(true);
        Options {
            syntax: self.syntax.clone(),
            escape: self.escape.clone(),
            locals_name: self.locals_name.clone(),
            use_with,
            strict: self.strict,
            compile_debug: self.compile_debug,
            output_function_name: self.output_function_name.clone(),
            filename: self.filename.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default() {
        let options = Options::default();
        assert_eq!(options.locals_name(), "locals");
        assert!(options.use_with());
        assert!(!options.strict());
        assert!(options.compile_debug());
        assert_eq!(options.output_function_name(), None);
        assert_eq!(options.filename(), None);
        assert_eq!(options.syntax().open_tag(), "<%");
        assert_eq!(options.syntax().close_tag(), "%>");
    }

    #[test]
    fn options_strict_disables_use_with() {
        let options = Options::builder().use_with(true).strict(true).build();
        assert!(options.strict());
        assert!(!options.use_with());
    }

    #[test]
    fn options_explicit_use_with() {
        let options = Options::builder().use_with(false).build();
        assert!(!options.use_with());
    }
}
