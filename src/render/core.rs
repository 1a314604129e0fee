use std::cmp::min;
use std::fmt::Write;

use crate::eval::Scope;
use crate::fmt::Formatter;
use crate::types::program::{Instr, Template};
use crate::{Engine, Error, Result, Value};

/// The label used in render errors when no filename is configured.
const DEFAULT_FILENAME: &str = "scriptlet";

/// How many lines around the failing line are shown in render errors.
const CONTEXT_LINES: usize = 3;

pub struct RendererImpl<'render> {
    pub(crate) engine: &'render Engine,
    pub(crate) template: &'render Template,
}

impl<'render> RendererImpl<'render> {
    pub(crate) fn render(&self, f: &mut Formatter<'_>, ctx: &Value) -> Result<()> {
        tracing::trace!(
            name = self.template.name.as_deref(),
            instrs = self.template.instrs.len(),
            "rendering template"
        );

        let mut scope = Scope::new(&self.engine.options, ctx);

        // The template line of the instruction being executed, kept up to
        // date by the `Line` instructions.
        let mut line = 1;

        for instr in &self.template.instrs {
            if let Err(err) = self.render_one(f, &mut scope, &mut line, instr) {
                return Err(self.rethrow(err, line));
            }
        }

        Ok(())
    }

    fn render_one(
        &self,
        f: &mut Formatter<'_>,
        scope: &mut Scope<'_>,
        line: &mut usize,
        instr: &Instr,
    ) -> Result<()> {
        let options = &self.engine.options;
        let evaluator = &*self.engine.evaluator;

        match instr {
            Instr::EmitLiteral(text) => {
                f.write_str(text)?;
            }

            Instr::Line(n) => {
                *line = *n;
            }

            Instr::Exec(fragment) => {
                evaluator.exec(&fragment.code, scope)?;
                flush(f, scope)?;
            }

            Instr::EmitEscaped(fragment) => {
                let value = evaluator.eval(&fragment.code, scope)?;
                flush(f, scope)?;
                options.escape(f, &value)?;
            }

            Instr::EmitRaw(fragment) => {
                let value = evaluator.eval(&fragment.code, scope)?;
                flush(f, scope)?;
                crate::fmt::default(f, &value)?;
            }
        }

        Ok(())
    }

    /// Adds the filename, the line and the surrounding template lines to an
    /// error raised while rendering.
    fn rethrow(&self, err: Error, line: usize) -> Error {
        let options = &self.engine.options;
        if !options.compile_debug {
            return err;
        }
        let filename = options.filename.as_deref().unwrap_or(DEFAULT_FILENAME);
        let context = context(&self.template.source, line);
        err.with_trace(filename, line, context)
    }
}

/// Writes the values appended through the output function.
fn flush(f: &mut Formatter<'_>, scope: &mut Scope<'_>) -> Result<()> {
    for value in scope.take_output() {
        crate::fmt::default(f, &value)?;
    }
    Ok(())
}

/// Formats the source lines around the given line, which is marked with
/// `>>`. Shows two lines before and three lines after it.
fn context(source: &str, line: usize) -> String {
    let lines: Vec<_> = source.split('\n').collect();
    let start = line.saturating_sub(CONTEXT_LINES);
    let end = min(lines.len(), line + CONTEXT_LINES);
    let mut context = String::new();
    for (i, text) in lines.iter().enumerate().take(end).skip(start) {
        let curr = i + 1;
        let marker = if curr == line { " >> " } else { "    " };
        if !context.is_empty() {
            context.push('\n');
        }
        context.push_str(marker);
        context.push_str(&curr.to_string());
        context.push_str("| ");
        context.push_str(text);
    }
    context
}
