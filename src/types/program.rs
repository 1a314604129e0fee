//! Defines a compiled [`Template`] which is a sequence of [`Instr`] that can
//! be executed by the renderer or turned into function source by the code
//! generator.

use crate::types::span::Span;

#[derive(Debug)]
pub struct Template {
    /// The preprocessed template source, all spans point into this.
    pub source: String,

    pub instrs: Vec<Instr>,

    /// The name captured from a `Template Name:` comment.
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    /// Append literal template text
    EmitLiteral(String),

    /// Evaluate the fragment and append the escaped result
    EmitEscaped(Fragment),

    /// Evaluate the fragment and append the result as is
    EmitRaw(Fragment),

    /// Run the fragment for its side effects
    Exec(Fragment),

    /// Update the current template line used in diagnostics
    Line(usize),
}

/// Script code found between a pair of tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub code: String,
    /// The span of the fragment text in the template source.
    pub span: Span,
}
