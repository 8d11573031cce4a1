//! Two-axis directive expansion for grid documents
//!
//! Sheets may embed structural directives in cells: `{% for %}`/`{% if %}`
//! blocks expand along the row axis, `{%col for %}`/`{%col if %}` blocks
//! along the column axis. Expansion runs in two strictly ordered phases:
//!
//! 1. **Column phase** — column blocks are planned and materialised. This
//!    phase is structural only: no cell content is rendered, but every
//!    surviving column is tagged with the column-loop context it was
//!    produced under.
//! 2. **Row phase** — row blocks are planned against the column-expanded
//!    sheet, the row plan is materialised, and finally every templated cell
//!    is rendered with its merged row and column context.
//!
//! Both phases are plan-based: a plan maps each output line back to its
//! source line, so source indices never shift mid-expansion.

pub mod block;
pub mod context;
pub mod copier;
pub mod directive;
pub mod env;
pub mod error;
pub mod expand;
pub mod render;

use gridtpl_core::Worksheet;
use minijinja::value::Value;
use minijinja::Environment;
use tracing::debug;

pub use crate::context::ColumnTag;
pub use crate::directive::Axis;
pub use crate::error::{Error, Result};

use crate::block::build_blocks;
use crate::context::value_to_map;
use crate::copier::{materialize_columns, materialize_rows};
use crate::expand::expand_axis;
use crate::render::render_sheet;

/// The expansion engine: a configured expression environment plus the
/// two-phase pipeline.
pub struct Engine {
    env: Environment<'static>,
}

impl Engine {
    /// Create an engine with the default environment (strict undefined
    /// handling, spreadsheet filters).
    pub fn new() -> Self {
        Self {
            env: env::template_env(),
        }
    }

    /// The underlying expression environment, for registering extra filters
    /// or globals before expansion.
    pub fn env_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }

    /// Expand one sheet against `data`, producing a new sheet.
    ///
    /// The input sheet is left untouched; on error nothing is produced.
    pub fn expand(&self, sheet: &Worksheet, data: &Value) -> Result<Worksheet> {
        let base = value_to_map(data);
        debug!(sheet = sheet.name(), "expanding sheet");

        let Some((_, _, _, max_col)) = sheet.used_bounds() else {
            return Ok(sheet.clone());
        };

        // Column phase: structure only, rendering is deferred to the row
        // phase so cross-axis cells see both contexts at once.
        let col_directives = directive::scan(sheet, Axis::Column)?;
        let (columned, tags) = if col_directives.is_empty() {
            (sheet.clone(), vec![None; max_col as usize + 1])
        } else {
            let blocks = build_blocks(Axis::Column, &col_directives)?;
            let plan = expand_axis(&self.env, Axis::Column, &blocks, max_col as u32, &base)?;
            materialize_columns(sheet, &plan)?
        };

        let Some((_, _, max_row, _)) = columned.used_bounds() else {
            return Ok(columned);
        };

        // Row phase: plan, materialise, then render every templated cell.
        let row_directives = directive::scan(&columned, Axis::Row)?;
        let blocks = build_blocks(Axis::Row, &row_directives)?;
        let plan = expand_axis(&self.env, Axis::Row, &blocks, max_row, &base)?;
        let mut out = materialize_rows(&columned, &plan)?;
        render_sheet(&self.env, &mut out, &plan, &tags, &base)?;
        Ok(out)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
