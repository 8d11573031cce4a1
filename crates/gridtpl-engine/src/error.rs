//! Error types for the expansion engine
//!
//! Two families: structural errors (malformed directive nesting, merges
//! straddling block boundaries, non-iterable loop payloads) and render errors
//! (expression evaluation failures). Structural errors are always fatal;
//! render errors are fatal unless the expression itself supplied a default
//! through the evaluator (e.g. minijinja's `default` filter).

use thiserror::Error;

use crate::directive::Axis;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during template expansion
#[derive(Debug, Error)]
pub enum Error {
    /// An opening directive was never closed
    #[error("Unclosed {{% {tag} %}} at {axis} {index}")]
    UnclosedDirective {
        axis: Axis,
        index: u32,
        tag: String,
    },

    /// A closing directive did not match the innermost open block
    #[error("Mismatched {{% {found} %}} at {axis} {index}, expected {expected}")]
    MismatchedDirective {
        axis: Axis,
        index: u32,
        found: String,
        expected: String,
    },

    /// A directive payload failed to parse (e.g. `for` without `in`)
    #[error("Invalid directive in cell {cell}: {text}")]
    InvalidDirective { cell: String, text: String },

    /// A directive shares its row/column with unrelated content
    #[error("Directive at {axis} {index} shares its {axis} with content in cell {cell}")]
    DirectiveNotAlone {
        axis: Axis,
        index: u32,
        cell: String,
    },

    /// A merged region crosses the boundary of an expanded or removed block
    #[error("Merged range {range} straddles a {axis} block boundary")]
    MergeAcrossBoundary { axis: Axis, range: String },

    /// A loop payload evaluated to something that cannot be iterated
    #[error("Expression '{expr}' at {axis} {index} is not iterable: {source}")]
    NotIterable {
        axis: Axis,
        index: u32,
        expr: String,
        #[source]
        source: minijinja::Error,
    },

    /// A directive payload (iterable or condition) failed to evaluate
    #[error("Failed to evaluate '{expr}' at {axis} {index}: {source}")]
    EvalDirective {
        axis: Axis,
        index: u32,
        expr: String,
        #[source]
        source: minijinja::Error,
    },

    /// An embedded cell expression failed to evaluate
    #[error("Failed to render cell {cell} on sheet '{sheet}': {source}")]
    RenderCell {
        sheet: String,
        cell: String,
        #[source]
        source: minijinja::Error,
    },

    /// Document model error
    #[error(transparent)]
    Core(#[from] gridtpl_core::Error),
}

impl Error {
    /// True for structural errors (malformed template), false for render
    /// errors (bad data or expressions in an otherwise well-formed template).
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            Error::EvalDirective { .. } | Error::RenderCell { .. }
        )
    }
}
