//! Compile `<% %>` scriptlet templates into render functions.
//!
//! # Features
//!
//! ### Syntax
//!
//! - Escaped output: `<%= user.name %>`
//! - Raw output: `<%- user.bio %>`
//! - Script code: `<% var name = user.name %>`
//! - Comments: `<%# Template Name: greeting %>`
//! - Literal delimiters: `<%%` renders as `<%`
//! - Whitespace trimming: `<%_ ... _%>` and newline trimming `<% ... -%>`
//! - Configurable delimiters: `<? user.name ?>`, `{{= user.name }}`
//!
//! ### Engine
//!
//! - Generate the source of a JavaScript render function, see [`compile`]
//! - Render templates directly with a pluggable [`Evaluator`]
//! - Render to a [`String`] or any [`std::io::Write`] implementor
//! - Render using any [`serde`] serializable values
//! - Convenient macro for quick rendering:
//!   `scriptlet::value!{ name: "John", age: 42 }`
//! - Error messages with the failing template line and its surroundings
//!
//! # Getting started
//!
//! Your entry point is the [`Engine`] struct. The engine stores the compiler
//! options, the evaluator and compiled templates. Generally, you only need to
//! construct one engine during the lifetime of a program.
//!
//! ```
//! let engine = scriptlet::Engine::new();
//! ```
//!
//! Next, [`.add_template`][Engine::add_template] is used to compile and store a
//! template in the engine.
//!
//! ```
//! # let mut engine = scriptlet::Engine::new();
//! engine.add_template("hello", "Hello <%= user.name %>!")?;
//! # Ok::<(), scriptlet::Error>(())
//! ```
//!
//! Finally, the template is rendered by fetching it using
//! [`.get_template`][Engine::get_template] and calling
//! [`.render`][TemplateRef::render].
//!
//! ```
//! # let mut engine = scriptlet::Engine::new();
//! # engine.add_template("hello", "Hello <%= user.name %>!")?;
//! let template = engine.get_template("hello").unwrap();
//! let result = template.render(scriptlet::value!{ user: { name: "John Smith" }})?;
//! assert_eq!(result, "Hello John Smith!");
//! # Ok::<(), scriptlet::Error>(())
//! ```
//!
//! If you don't need to store the compiled template then you can also use the
//! [`.compile`][Engine::compile] function to return the template directly.
//!
//! ```
//! # let engine = scriptlet::Engine::new();
//! let template = engine.compile("Hello <%= user.name %>!")?;
//! let result = template.render(scriptlet::value!{ user: { name: "John Smith" }})?;
//! assert_eq!(result, "Hello John Smith!");
//! # Ok::<(), scriptlet::Error>(())
//! ```
//!
//! # Examples
//!
//! ### Generate a render function
//!
//! The free [`compile`] function turns a template into the source of a
//! JavaScript function expression. The function expects the [`RUNTIME`]
//! helpers to be in scope.
//!
//! ```
//! use scriptlet::Options;
//!
//! let options = Options::builder().compile_debug(false).build();
//! let function = scriptlet::compile("<%# Template Name: hi %>Hi <%= name %>", &options)?;
//!
//! assert_eq!(function.name.as_deref(), Some("hi"));
//! assert!(function.code.starts_with("/* hi */ function (locals) {"));
//! # Ok::<(), scriptlet::Error>(())
//! ```
//!
//! ### Render using structured data
//!
//! ```
//! #[derive(serde::Serialize)]
//! struct Context { user: User }
//!
//! #[derive(serde::Serialize)]
//! struct User { name: String }
//!
//! let ctx = Context { user: User { name: "John Smith".into() } };
//!
//! let result = scriptlet::Engine::new()
//!     .compile("Hello <%= user.name %>")?
//!     .render(&ctx)?;
//!
//! assert_eq!(result, "Hello John Smith");
//! # Ok::<(), scriptlet::Error>(())
//! ```
//!
//! ### Render a template using custom delimiters
//!
//! ```
//! use scriptlet::{Engine, Options, Syntax};
//!
//! let syntax = Syntax::builder().open("<").close(">").delimiter("?").build();
//! let options = Options::builder().syntax(syntax).build();
//!
//! let result = Engine::with_options(options)
//!     .compile("Hello <?= user.name ?>")?
//!     .render(scriptlet::value!{ user: { name: "John Smith" }})?;
//!
//! assert_eq!(result, "Hello John Smith");
//! # Ok::<(), scriptlet::Error>(())
//! ```
//!
//! ### Render a template to an `impl io::Write`
//!
//! ```
//! use std::io;
//!
//! let stdout = io::BufWriter::new(io::stdout());
//!
//! scriptlet::Engine::new()
//!     .compile("Hello <%= user.name %>")?
//!     .render_to_writer(stdout, scriptlet::value! { user: { name: "John Smith" }})?;
//! #
//! # Ok::<(), scriptlet::Error>(())
//! ```

mod codegen;
mod compile;
mod error;
pub mod eval;
pub mod fmt;
mod macros;
mod render;
mod types;
mod value;

use std::collections::BTreeMap;
use std::io;

pub use crate::codegen::{FunctionSource, RUNTIME};
pub use crate::error::{Error, ErrorKind};
pub use crate::eval::{DefaultEvaluator, Evaluator, Scope};
pub use crate::types::options::{Options, OptionsBuilder};
pub use crate::types::syntax::{Syntax, SyntaxBuilder};
#[cfg(feature = "serde")]
pub use crate::value::to_value;
pub use crate::value::Value;

use crate::compile::Searcher;
use crate::types::program;

/// A type alias for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Compile a template into the source of a JavaScript render function.
///
/// This is a one-shot compile, the template is not stored anywhere. Use an
/// [`Engine`] to compile many templates with the same options or to render
/// them directly.
pub fn compile(source: &str, options: &Options) -> Result<FunctionSource> {
    let searcher = Searcher::new(&options.syntax);
    let template = compile::template(&searcher, options, source)?;
    Ok(codegen::function_source(&template, options))
}

/// The compilation and rendering engine.
pub struct Engine {
    options: Options,
    searcher: Searcher,
    evaluator: Box<dyn Evaluator>,
    globals: Value,
    templates: BTreeMap<String, program::Template>,
}

/// A compiled template.
pub struct Template<'engine> {
    engine: &'engine Engine,
    template: program::Template,
}

/// A reference to a compiled template in an [`Engine`].
#[derive(Clone, Copy)]
pub struct TemplateRef<'engine> {
    engine: &'engine Engine,
    template: &'engine program::Template,
}

impl Default for Engine {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Construct a new engine with the default options.
    #[inline]
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Construct a new engine with custom options.
    ///
    /// # Examples
    ///
    /// ```
    /// use scriptlet::{Engine, Options};
    ///
    /// let options = Options::builder().output_function_name("echo").build();
    /// let engine = Engine::with_options(options);
    /// ```
    #[inline]
    pub fn with_options(options: Options) -> Self {
        Self {
            searcher: Searcher::new(&options.syntax),
            options,
            evaluator: Box::new(DefaultEvaluator),
            globals: Value::None,
            templates: BTreeMap::new(),
        }
    }

    /// Returns the compiler options.
    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Set the evaluator used to run the script code of templates.
    #[inline]
    pub fn set_evaluator<E>(&mut self, evaluator: E)
    where
        E: Evaluator + 'static,
    {
        self.evaluator = Box::new(evaluator);
    }

    /// Set the default render context.
    ///
    /// Every render context is layered on top of the globals, a key in the
    /// render context wins unless its value is `null`.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[inline]
    pub fn set_globals<S>(&mut self, globals: S) -> Result<()>
    where
        S: serde::Serialize,
    {
        self.globals = to_value(globals)?;
        Ok(())
    }

    /// Set the default render context using a [`Value`].
    ///
    /// See [`.set_globals(..)`][Engine::set_globals] for how it is merged.
    #[inline]
    pub fn set_globals_from(&mut self, globals: Value) {
        self.globals = globals;
    }

    /// Add a template to the engine.
    ///
    /// The template is compiled and stored under the name given in its
    /// `Template Name:` comment, or under `name` if it has none. Returns the
    /// name the template was stored under.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut engine = scriptlet::Engine::new();
    /// let name = engine.add_template("fallback", "<%# Template Name: greeting %>Hi")?;
    /// assert_eq!(name, "greeting");
    /// assert!(engine.get_template("fallback").is_none());
    /// # Ok::<(), scriptlet::Error>(())
    /// ```
    pub fn add_template(&mut self, name: impl Into<String>, source: &str) -> Result<String> {
        let template = compile::template(&self.searcher, &self.options, source)?;
        let name = template.name.clone().unwrap_or_else(|| name.into());
        self.templates.insert(name.clone(), template);
        Ok(name)
    }

    /// Lookup a template by name.
    #[inline]
    pub fn get_template(&self, name: &str) -> Option<TemplateRef<'_>> {
        self.templates.get(name).map(|template| TemplateRef {
            engine: self,
            template,
        })
    }

    /// Lookup a template by name and render it to a string.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    pub fn render<S>(&self, name: &str, ctx: S) -> Result<String>
    where
        S: serde::Serialize,
    {
        match self.get_template(name) {
            Some(template) => template.render(ctx),
            None => Err(Error::new(
                ErrorKind::NotFound,
                format!("template `{name}` not found"),
            )),
        }
    }

    /// Compile a template.
    ///
    /// The template will not be stored in the engine.
    #[inline]
    pub fn compile(&self, source: &str) -> Result<Template<'_>> {
        let template = compile::template(&self.searcher, &self.options, source)?;
        Ok(Template {
            engine: self,
            template,
        })
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .field("searcher", &self.searcher)
            .field("globals", &self.globals)
            .field("templates", &self.templates.keys())
            .finish_non_exhaustive()
    }
}

impl<'engine> Template<'engine> {
    /// Render the template to a string using the provided value.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[inline]
    pub fn render<S>(&self, ctx: S) -> Result<String>
    where
        S: serde::Serialize,
    {
        render::to_string(self.engine, &self.template, &to_value(ctx)?)
    }

    /// Render the template to a string using the provided [`Value`].
    #[inline]
    pub fn render_from(&self, ctx: &Value) -> Result<String> {
        render::to_string(self.engine, &self.template, ctx)
    }

    /// Render the template to a writer using the provided value.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[inline]
    pub fn render_to_writer<W, S>(&self, writer: W, ctx: S) -> Result<()>
    where
        W: io::Write,
        S: serde::Serialize,
    {
        render::to_writer(self.engine, &self.template, &to_value(ctx)?, writer)
    }

    /// Render the template to a writer using the provided [`Value`].
    #[inline]
    pub fn render_from_to_writer<W>(&self, writer: W, ctx: &Value) -> Result<()>
    where
        W: io::Write,
    {
        render::to_writer(self.engine, &self.template, ctx, writer)
    }

    /// Returns the name captured from a `Template Name:` comment.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.template.name.as_deref()
    }

    /// Returns the template source after whitespace preprocessing.
    #[inline]
    pub fn source(&self) -> &str {
        &self.template.source
    }

    /// Generate the JavaScript render function for this template.
    #[inline]
    pub fn function_source(&self) -> FunctionSource {
        codegen::function_source(&self.template, &self.engine.options)
    }
}

impl std::fmt::Debug for Template<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.template.name)
            .field("instrs", &self.template.instrs)
            .finish_non_exhaustive()
    }
}

impl<'engine> TemplateRef<'engine> {
    /// Render the template to a string using the provided value.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[inline]
    pub fn render<S>(&self, ctx: S) -> Result<String>
    where
        S: serde::Serialize,
    {
        render::to_string(self.engine, self.template, &to_value(ctx)?)
    }

    /// Render the template to a string using the provided [`Value`].
    #[inline]
    pub fn render_from(&self, ctx: &Value) -> Result<String> {
        render::to_string(self.engine, self.template, ctx)
    }

    /// Render the template to a writer using the provided value.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[inline]
    pub fn render_to_writer<W, S>(&self, writer: W, ctx: S) -> Result<()>
    where
        W: io::Write,
        S: serde::Serialize,
    {
        render::to_writer(self.engine, self.template, &to_value(ctx)?, writer)
    }

    /// Render the template to a writer using the provided [`Value`].
    #[inline]
    pub fn render_from_to_writer<W>(&self, writer: W, ctx: &Value) -> Result<()>
    where
        W: io::Write,
    {
        render::to_writer(self.engine, self.template, ctx, writer)
    }

    /// Returns the name captured from a `Template Name:` comment.
    #[inline]
    pub fn name(&self) -> Option<&'engine str> {
        self.template.name.as_deref()
    }

    /// Returns the template source after whitespace preprocessing.
    #[inline]
    pub fn source(&self) -> &'engine str {
        &self.template.source
    }

    /// Generate the JavaScript render function for this template.
    #[inline]
    pub fn function_source(&self) -> FunctionSource {
        codegen::function_source(self.template, &self.engine.options)
    }
}

impl std::fmt::Debug for TemplateRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRef")
            .field("name", &self.template.name)
            .field("instrs", &self.template.instrs)
            .finish_non_exhaustive()
    }
}
