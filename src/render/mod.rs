//! Render a compiled template by interpreting its instruction list.

mod core;

use std::borrow::Cow;
use std::io;

use crate::fmt::{Formatter, IoAdapter};
use crate::render::core::RendererImpl;
use crate::types::program::Template;
use crate::{Engine, Error, Result, Value};

/// Render the template to a string.
pub(crate) fn to_string(engine: &Engine, template: &Template, ctx: &Value) -> Result<String> {
    let ctx = with_globals(engine, ctx);
    let mut s = String::with_capacity(template.source.len());
    let mut f = Formatter::with_string(&mut s);
    RendererImpl { engine, template }.render(&mut f, &ctx)?;
    Ok(s)
}

/// Render the template to a writer.
pub(crate) fn to_writer<W>(
    engine: &Engine,
    template: &Template,
    ctx: &Value,
    writer: W,
) -> Result<()>
where
    W: io::Write,
{
    let ctx = with_globals(engine, ctx);
    let mut io = IoAdapter::new(writer);
    let mut f = Formatter::with_io(&mut io);
    let result = RendererImpl { engine, template }.render(&mut f, &ctx);
    drop(f);
    match (result, io.into_error()) {
        (_, Some(err)) => Err(Error::from(err)),
        (result, None) => result,
    }
}

/// Layers the render context over the engine globals.
fn with_globals<'a>(engine: &Engine, ctx: &'a Value) -> Cow<'a, Value> {
    match &engine.globals {
        Value::None => Cow::Borrowed(ctx),
        globals => Cow::Owned(globals.merged(ctx)),
    }
}
