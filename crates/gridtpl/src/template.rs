//! Workbook-level rendering
//!
//! [`Template`] drives the expansion engine across every sheet of a
//! workbook. Rendering is all-or-nothing: each sheet expands into a fresh
//! worksheet, and only once every sheet has succeeded is the output workbook
//! assembled. A failure part-way through leaves nothing half-rendered.

use gridtpl_core::Workbook;
use gridtpl_engine::{Engine, Result};
use minijinja::value::Value;
use serde::Serialize;
use tracing::debug;

/// A renderable workbook template.
#[derive(Default)]
pub struct Template {
    engine: Engine,
}

impl Template {
    /// Create a template renderer with the default engine.
    pub fn new() -> Self {
        Self {
            engine: Engine::new(),
        }
    }

    /// The underlying engine, for registering custom filters or globals.
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Render the template workbook against `data`, producing a new
    /// workbook. The template is left untouched and can be rendered again
    /// with different data.
    pub fn render<S: Serialize>(&self, template: &Workbook, data: S) -> Result<Workbook> {
        let data = Value::from_serialize(&data);
        debug!(sheets = template.sheet_count(), "rendering workbook");

        let mut rendered = Vec::with_capacity(template.sheet_count());
        for sheet in template.worksheets() {
            rendered.push(self.engine.expand(sheet, &data)?);
        }

        let mut out = Workbook::empty();
        for sheet in rendered {
            out.add_existing_worksheet(sheet)?;
        }
        Ok(out)
    }

    /// Render in place: every sheet of `workbook` is replaced by its
    /// expansion. On error the workbook is left exactly as it was.
    pub fn render_in_place<S: Serialize>(&self, workbook: &mut Workbook, data: S) -> Result<()> {
        let data = Value::from_serialize(&data);

        let mut rendered = Vec::with_capacity(workbook.sheet_count());
        for sheet in workbook.worksheets() {
            rendered.push(self.engine.expand(sheet, &data)?);
        }
        for (index, sheet) in rendered.into_iter().enumerate() {
            workbook.replace_worksheet(index, sheet)?;
        }
        Ok(())
    }
}
