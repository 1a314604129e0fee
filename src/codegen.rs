//! Generate JavaScript function source from a compiled template.
//!
//! The generated function takes the render context as its single parameter
//! and returns the rendered string. It expects the helpers in [`RUNTIME`] to
//! be in scope.
//!
//! ```
//! let func = scriptlet::compile("Hi <%= name %>", &Default::default())?;
//! assert!(func.code.starts_with("function (locals) {"));
//! # Ok::<(), scriptlet::Error>(())
//! ```

use std::fmt;

use crate::types::options::Options;
use crate::types::program::{Instr, Template};

/// The free helpers the generated function expects to be in scope.
///
/// `__esc` escapes `&`, `<`, `>`, `"` and `'` with the same entities as
/// [`escape_html`][crate::fmt::escape_html]. `__rethrow` prefixes an error
/// message with the filename, the line and the surrounding template lines.
pub const RUNTIME: &str = r#"var __esc = (function () {
  var entities = { "&": "&amp;", "<": "&lt;", ">": "&gt;", '"': "&#34;", "'": "&#39;" };
  return function (value) {
    return value == null ? "" : String(value).replace(/[&<>"']/g, function (c) {
      return entities[c];
    });
  };
})();

function __rethrow(err, lines, filename, lineno) {
  if (err.__rethrown) throw err;
  var all = lines.split("\n");
  var start = Math.max(lineno - 3, 0);
  var end = Math.min(all.length, lineno + 3);
  var label = filename || "scriptlet";
  var context = all.slice(start, end).map(function (line, i) {
    var curr = i + start + 1;
    return (curr == lineno ? " >> " : "    ") + curr + "| " + line;
  }).join("\n");
  err.path = label;
  err.message = label + ":" + lineno + "\n" + context + "\n\n" + err.message;
  err.__rethrown = true;
  throw err;
}
"#;

/// The JavaScript source of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSource {
    /// The name captured from a `Template Name:` comment.
    pub name: Option<String>,
    /// The complete function expression.
    pub code: String,
}

impl fmt::Display for FunctionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// Generate the function source for the template.
pub(crate) fn function_source(template: &Template, options: &Options) -> FunctionSource {
    let code = Codegen { template, options }.to_string();
    FunctionSource {
        name: template.name.clone(),
        code,
    }
}

struct Codegen<'a> {
    template: &'a Template,
    options: &'a Options,
}

impl fmt::Display for Codegen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Options {
            locals_name,
            use_with,
            strict,
            compile_debug,
            output_function_name,
            filename,
            ..
        } = self.options;

        if let Some(name) = &self.template.name {
            write!(f, "/* {name} */ ")?;
        }
        writeln!(f, "function ({locals_name}) {{")?;

        if *strict {
            writeln!(f, "\"use strict\";")?;
        }
        if *compile_debug {
            write!(f, "var __line = 1, __lines = ")?;
            write_str_literal(f, &self.template.source)?;
            write!(f, ", __filename = ")?;
            match filename {
                Some(filename) => write_str_literal(f, filename)?,
                None => write!(f, "undefined")?,
            }
            writeln!(f, ";")?;
            writeln!(f, "try {{")?;
        }

        writeln!(
            f,
            "var __output = [], __append = __output.push.bind(__output);"
        )?;
        if let Some(alias) = output_function_name {
            writeln!(f, "var {alias} = __append;")?;
        }
        if *use_with {
            writeln!(f, "with ({locals_name} || {{}}) {{")?;
        }

        for instr in &self.template.instrs {
            match instr {
                Instr::EmitLiteral(text) => {
                    write!(f, "    ; __append(")?;
                    write_str_literal(f, text)?;
                    writeln!(f, ")")?;
                }
                Instr::EmitEscaped(frag) => writeln!(f, "    ; __append(__esc({}))", frag.code)?,
                Instr::EmitRaw(frag) => writeln!(f, "    ; __append({})", frag.code)?,
                Instr::Exec(frag) => writeln!(f, "    ; {}", frag.code)?,
                Instr::Line(n) => writeln!(f, "    ; __line = {n}")?,
            }
        }

        if *use_with {
            writeln!(f, "}}")?;
        }
        writeln!(f, "return __output.join(\"\");")?;

        if *compile_debug {
            writeln!(f, "}} catch (e) {{")?;
            writeln!(f, "  __rethrow(e, __lines, __filename, __line);")?;
            writeln!(f, "}}")?;
        }
        write!(f, "}}")
    }
}

/// Writes `s` as a double quoted string literal.
///
/// Backslashes are escaped first so that the escapes added for line breaks
/// and quotes are not doubled.
fn write_str_literal(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    let mut last = 0;
    for (i, c) in s.char_indices() {
        let escaped = match c {
            '\\' => "\\\\",
            '\n' => "\\n",
            '\r' => "\\r",
            '"' => "\\\"",
            _ => continue,
        };
        f.write_str(&s[last..i])?;
        f.write_str(escaped)?;
        last = i + c.len_utf8();
    }
    f.write_str(&s[last..])?;
    f.write_str("\"")
}
