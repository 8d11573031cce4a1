//! Cell rendering
//!
//! The final pipeline stage: after both axes are materialised, every cell
//! that still carries template tags is rendered against its merged context.
//!
//! A cell whose entire content is one `{{ expr }}` tag keeps the evaluated
//! value's native type (numbers stay numbers, booleans stay booleans,
//! date-shaped strings become datetimes). Mixed content renders to a string.
//! Formula cells render their formula text but remain formulas.

use std::collections::BTreeMap;

use gridtpl_core::{CellAddress, CellValue, Worksheet};
use minijinja::value::{Value, ValueKind};
use minijinja::Environment;
use tracing::debug;

use crate::context::{cell_context, ColumnTag};
use crate::directive::{has_template_tag, pure_expression};
use crate::env::parse_datetime;
use crate::error::{Error, Result};
use crate::expand::AxisInstance;

/// Render all templated cells of a materialised sheet in place.
///
/// `row_plan[i]` supplies the loop context of output row `i`; `tags[c]` the
/// column context of output column `c`.
pub fn render_sheet(
    env: &Environment<'static>,
    sheet: &mut Worksheet,
    row_plan: &[AxisInstance],
    tags: &[Option<ColumnTag>],
    base: &BTreeMap<String, Value>,
) -> Result<()> {
    let mut rendered = 0usize;
    for (row, instance) in row_plan.iter().enumerate() {
        let row = row as u32;
        let templated: Vec<(u16, CellValue)> = sheet
            .iter_row(row)
            .filter_map(|(col, data)| match &data.value {
                CellValue::String(s) if has_template_tag(s) => Some((col, data.value.clone())),
                CellValue::Formula { text } if has_template_tag(text) => {
                    Some((col, data.value.clone()))
                }
                _ => None,
            })
            .collect();

        for (col, value) in templated {
            let tag = tags.get(col as usize).and_then(|t| t.as_ref());
            let ctx = cell_context(base, tag, &instance.bindings, instance.meta.as_ref());
            let new_value = match &value {
                CellValue::String(content) => render_content(env, content, ctx)
                    .map_err(|source| render_error(sheet, row, col, source))?,
                CellValue::Formula { text } => {
                    let rendered = env
                        .render_str(text, ctx)
                        .map_err(|source| render_error(sheet, row, col, source))?;
                    CellValue::formula(rendered)
                }
                _ => continue,
            };
            sheet.set_cell_value_at(row, col, new_value)?;
            rendered += 1;
        }
    }
    debug!(sheet = sheet.name(), cells = rendered, "sheet rendered");
    Ok(())
}

/// Render a string cell's content, preserving the native type of a pure
/// expression.
fn render_content(
    env: &Environment<'static>,
    content: &str,
    ctx: Value,
) -> std::result::Result<CellValue, minijinja::Error> {
    if let Some(expr) = pure_expression(content) {
        let value = env.compile_expression(expr)?.eval(ctx)?;
        return Ok(native_cell_value(value));
    }
    Ok(CellValue::String(env.render_str(content, ctx)?))
}

/// Map an evaluated expression result onto a typed cell value.
fn native_cell_value(value: Value) -> CellValue {
    match value.kind() {
        ValueKind::Undefined | ValueKind::None => CellValue::Empty,
        ValueKind::Bool => CellValue::Boolean(value.is_true()),
        ValueKind::Number => match value.as_i64() {
            Some(n) => CellValue::Number(n as f64),
            None => CellValue::Number(f64::try_from(value.clone()).unwrap_or(f64::NAN)),
        },
        ValueKind::String => {
            let text = value.to_string();
            match parse_datetime(&text) {
                Some(dt) => CellValue::DateTime(dt),
                None => CellValue::String(text),
            }
        }
        _ => CellValue::String(value.to_string()),
    }
}

fn render_error(sheet: &Worksheet, row: u32, col: u16, source: minijinja::Error) -> Error {
    Error::RenderCell {
        sheet: sheet.name().to_string(),
        cell: CellAddress::new(row, col).to_a1_string(),
        source,
    }
}
