//! Run the script code found between tags.
//!
//! Compiled templates are rendered by walking their instruction list. Every
//! fragment of script code, `<% x = 1 %>` or `<%= user.name %>`, is handed to
//! an [`Evaluator`] together with the [`Scope`] of the current render.
//!
//! The bundled [`DefaultEvaluator`] understands a deliberately tiny subset of
//! JavaScript:
//!
//! - Expressions: paths like `user.name` or `users.0.name`, `length` on
//!   lists and strings, string literals in `"` or `'`, numbers, `true`,
//!   `false`, `null` and `undefined`.
//! - Statements separated by `;` or line breaks: `name = expr`,
//!   `var name = expr` (also `let` and `const`), calls to the configured
//!   [output function][crate::OptionsBuilder::output_function_name] like
//!   `echo(expr)`, bare expressions and `//` line comments.
//!
//! Anything else, such as control flow, needs a custom [`Evaluator`].
//!
//! # Examples
//!
//! ### Implement a custom evaluator
//!
//! ```
//! use scriptlet::{Engine, Evaluator, Result, Scope, Value};
//!
//! struct Shout;
//!
//! impl Evaluator for Shout {
//!     fn exec(&self, _: &str, _: &mut Scope<'_>) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn eval(&self, code: &str, scope: &mut Scope<'_>) -> Result<Value> {
//!         match scope.resolve(code.trim())? {
//!             Value::String(s) => Ok(Value::from(s.to_uppercase())),
//!             value => Ok(value.clone()),
//!         }
//!     }
//! }
//!
//! let mut engine = Engine::new();
//! engine.set_evaluator(Shout);
//! let result = engine
//!     .compile("Hello <%= name %>!")?
//!     .render(scriptlet::value! { name: "World" })?;
//! assert_eq!(result, "Hello WORLD!");
//! # Ok::<(), scriptlet::Error>(())
//! ```

mod lex;
mod parse;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::mem;

use crate::eval::parse::{Expr, Parser, Stmt};
use crate::types::options::Options;
use crate::{Error, Result, Value};

/// Runs the script code of a template.
pub trait Evaluator: Send + Sync {
    /// Run the code of an eval tag, e.g. `<% x = 1 %>`, for its effects.
    fn exec(&self, code: &str, scope: &mut Scope<'_>) -> Result<()>;

    /// Evaluate the code of an output tag, e.g. `<%= user.name %>`.
    ///
    /// Trailing `;` have already been stripped from the code.
    fn eval(&self, code: &str, scope: &mut Scope<'_>) -> Result<Value>;
}

/// The evaluator used when no other is set on the [`Engine`][crate::Engine].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEvaluator;

/// The variables visible to the script code while rendering.
#[derive(Debug)]
pub struct Scope<'a> {
    locals: &'a Value,
    locals_name: &'a str,
    use_with: bool,
    output_function_name: Option<&'a str>,
    vars: BTreeMap<String, Value>,
    output: Vec<Value>,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(options: &'a Options, locals: &'a Value) -> Self {
        Self {
            locals,
            locals_name: &options.locals_name,
            use_with: options.use_with,
            output_function_name: options.output_function_name.as_deref(),
            vars: BTreeMap::new(),
            output: Vec::new(),
        }
    }

    /// Returns the render context.
    pub fn locals(&self) -> &'a Value {
        self.locals
    }

    /// The identifier the render context is bound to.
    pub fn locals_name(&self) -> &str {
        self.locals_name
    }

    /// Whether the fields of the render context are bare identifiers.
    pub fn use_with(&self) -> bool {
        self.use_with
    }

    /// The alias bound to the append operation, if any.
    pub fn output_function_name(&self) -> Option<&str> {
        self.output_function_name
    }

    /// Resolve an identifier.
    ///
    /// Variables set during the render are checked first, then the fields of
    /// the render context if `use_with` is enabled and finally the locals
    /// name itself which refers to the entire render context.
    pub fn resolve(&self, name: &str) -> Result<&Value> {
        if let Some(value) = self.vars.get(name) {
            return Ok(value);
        }
        if self.use_with {
            if let Value::Map(map) = self.locals {
                if let Some(value) = map.get(name) {
                    return Ok(value);
                }
            }
        }
        if name == self.locals_name {
            return Ok(self.locals);
        }
        Err(Error::eval(format!("`{name}` is not defined")))
    }

    /// Resolve a path, e.g. `["user", "names", "0"]`.
    ///
    /// Missing map keys and list indexes are [`Value::None`], only indexing
    /// into [`Value::None`] itself is an error.
    pub fn resolve_path(&self, path: &[&str]) -> Result<Value> {
        let Some((first, rest)) = path.split_first() else {
            return Ok(Value::None);
        };
        let mut value = Cow::Borrowed(self.resolve(first)?);
        for member in rest {
            value = match value {
                Cow::Borrowed(v) => index(v, member)?,
                Cow::Owned(v) => Cow::Owned(index(&v, member)?.into_owned()),
            };
        }
        Ok(value.into_owned())
    }

    /// Set a variable, shadowing any field of the render context.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    /// Append a value to the rendered output.
    ///
    /// The value is formatted with the default formatter, i.e. unescaped.
    pub fn append(&mut self, value: Value) {
        self.output.push(value);
    }

    pub(crate) fn take_output(&mut self) -> Vec<Value> {
        mem::take(&mut self.output)
    }
}

/// Index into the value with a single path member.
fn index<'v>(value: &'v Value, member: &str) -> Result<Cow<'v, Value>> {
    let found = match value {
        Value::Map(map) => map.get(member),
        Value::List(list) if member == "length" => {
            return Ok(Cow::Owned(Value::from(list.len())));
        }
        Value::List(list) => member.parse::<usize>().ok().and_then(|i| list.get(i)),
        Value::String(s) if member == "length" => {
            return Ok(Cow::Owned(Value::from(s.chars().count())));
        }
        Value::None => {
            return Err(Error::eval(format!(
                "cannot read property `{member}` of undefined"
            )));
        }
        _ => None,
    };
    Ok(found.map_or(Cow::Owned(Value::None), Cow::Borrowed))
}

impl Evaluator for DefaultEvaluator {
    fn exec(&self, code: &str, scope: &mut Scope<'_>) -> Result<()> {
        for stmt in Parser::new(code)?.parse_stmts()? {
            match stmt {
                Stmt::Declare(name, expr) | Stmt::Assign(name, expr) => {
                    let value = eval_expr(&expr, scope)?;
                    scope.set(name, value);
                }
                Stmt::Call(name, arg) => {
                    if scope.output_function_name() != Some(name) {
                        return Err(Error::eval(format!("`{name}` is not a function")));
                    }
                    let value = match arg {
                        Some(expr) => eval_expr(&expr, scope)?,
                        None => Value::None,
                    };
                    scope.append(value);
                }
                Stmt::Expr(expr) => {
                    eval_expr(&expr, scope)?;
                }
            }
        }
        Ok(())
    }

    fn eval(&self, code: &str, scope: &mut Scope<'_>) -> Result<Value> {
        let expr = Parser::new(code)?.parse_single_expr()?;
        eval_expr(&expr, scope)
    }
}

fn eval_expr(expr: &Expr<'_>, scope: &Scope<'_>) -> Result<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Path(path) => scope.resolve_path(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::value;

    #[test]
    fn scope_resolve_order() {
        let options = Options::default();
        let locals = value! { name: "ctx", locals: "field" };
        let mut scope = Scope::new(&options, &locals);
        assert_eq!(scope.resolve("name").unwrap(), &Value::from("ctx"));
        assert_eq!(scope.resolve("locals").unwrap(), &Value::from("field"));
        scope.set("name", Value::from("var"));
        assert_eq!(scope.resolve("name").unwrap(), &Value::from("var"));
    }

    #[test]
    fn scope_resolve_without_with() {
        let options = Options::builder().use_with(false).build();
        let locals = value! { name: "ctx" };
        let scope = Scope::new(&options, &locals);
        let err = scope.resolve("name").unwrap_err();
        assert_eq!(err.to_string(), "`name` is not defined");
        assert_eq!(
            scope.resolve_path(&["locals", "name"]).unwrap(),
            Value::from("ctx")
        );
    }

    #[test]
    fn scope_resolve_path_members() {
        let options = Options::default();
        let locals = value! { users: [{ name: "Ann" }, { name: "Bob" }], title: "Hey" };
        let scope = Scope::new(&options, &locals);
        let get = |path: &[&str]| scope.resolve_path(path).unwrap();
        assert_eq!(get(&["users", "1", "name"]), Value::from("Bob"));
        assert_eq!(get(&["users", "length"]), Value::from(2));
        assert_eq!(get(&["title", "length"]), Value::from(3));
        assert_eq!(get(&["users", "7"]), Value::None);
        assert_eq!(get(&["users", "0", "age"]), Value::None);
        assert_eq!(get(&["title", "x"]), Value::None);
    }

    #[test]
    fn scope_resolve_path_into_none() {
        let options = Options::default();
        let locals = value! { user: {} };
        let scope = Scope::new(&options, &locals);
        let err = scope.resolve_path(&["user", "address", "city"]).unwrap_err();
        assert_eq!(err.to_string(), "cannot read property `city` of undefined");
    }

    #[test]
    fn default_evaluator_exec() {
        let options = Options::builder().output_function_name("echo").build();
        let locals = value! { user: { name: "Ann" } };
        let mut scope = Scope::new(&options, &locals);
        DefaultEvaluator
            .exec("var n = user.name; echo(n)\necho('!') // done", &mut scope)
            .unwrap();
        assert_eq!(scope.resolve("n").unwrap(), &Value::from("Ann"));
        assert_eq!(
            scope.take_output(),
            [Value::from("Ann"), Value::from("!")]
        );
        assert!(scope.take_output().is_empty());
    }

    #[test]
    fn default_evaluator_exec_unknown_function() {
        let options = Options::default();
        let locals = Value::None;
        let mut scope = Scope::new(&options, &locals);
        let err = DefaultEvaluator.exec("print(1)", &mut scope).unwrap_err();
        assert_eq!(err.to_string(), "`print` is not a function");
    }

    #[test]
    fn default_evaluator_eval() {
        let options = Options::default();
        let locals = value! { n: 3 };
        let mut scope = Scope::new(&options, &locals);
        assert_eq!(DefaultEvaluator.eval(" n ", &mut scope).unwrap(), Value::from(3));
        assert_eq!(DefaultEvaluator.eval("'a'", &mut scope).unwrap(), Value::from("a"));
        let err = DefaultEvaluator.eval("missing", &mut scope).unwrap_err();
        assert_eq!(err.to_string(), "`missing` is not defined");
    }
}
