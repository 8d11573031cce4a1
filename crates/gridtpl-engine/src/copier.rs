//! Plan materialisation
//!
//! Turns an axis plan into a fresh worksheet: cells, styles, dimensions and
//! merged regions are copied from the source line each instance points at.
//! Directive lines are absent from plans, so they vanish here without any
//! explicit deletion.
//!
//! Merged regions are rebased by locating each region's full consecutive
//! source run in the plan. A region whose lines all disappeared is dropped;
//! a region that survives only partially straddles a block boundary and is
//! an error.

use gridtpl_core::{CellRange, Worksheet, MAX_COLS, MAX_ROWS};

use crate::context::ColumnTag;
use crate::directive::Axis;
use crate::error::{Error, Result};
use crate::expand::AxisInstance;

/// Materialise a column plan into a new worksheet.
///
/// Returns the rebuilt sheet together with one [`ColumnTag`] slot per output
/// column; columns that came from inside a column block carry their captured
/// loop context, plain columns carry `None`.
pub fn materialize_columns(
    src: &Worksheet,
    plan: &[AxisInstance],
) -> Result<(Worksheet, Vec<Option<ColumnTag>>)> {
    if plan.len() > MAX_COLS as usize {
        return Err(Error::Core(gridtpl_core::Error::ColumnOutOfBounds(
            u16::MAX,
            MAX_COLS,
        )));
    }

    let mut out = Worksheet::new(src.name());
    let mut tags = Vec::with_capacity(plan.len());

    for (dst, instance) in plan.iter().enumerate() {
        let dst = dst as u16;
        let src_col = instance.src as u16;
        for (row, data) in src.iter_col(src_col) {
            out.set_cell_at(row, dst, data.clone())?;
        }
        out.set_column_width(dst, src.column_width(src_col));
        out.set_column_hidden(dst, src.is_column_hidden(src_col));

        tags.push(
            (instance.meta.is_some() || !instance.bindings.is_empty()).then(|| ColumnTag {
                bindings: instance.bindings.clone(),
                meta: instance.meta.clone(),
            }),
        );
    }

    for (row, height) in src.custom_row_heights() {
        out.set_row_height(row, height);
    }
    for row in src.hidden_rows() {
        out.set_row_hidden(row, true);
    }
    for range in rebase_regions(Axis::Column, src.merged_regions(), plan)? {
        out.merge_cells(range)?;
    }
    Ok((out, tags))
}

/// Materialise a row plan into a new worksheet.
///
/// Column positions are fixed by this point, so column tags computed during
/// column materialisation remain valid for the result.
pub fn materialize_rows(src: &Worksheet, plan: &[AxisInstance]) -> Result<Worksheet> {
    if plan.len() > MAX_ROWS as usize {
        return Err(Error::Core(gridtpl_core::Error::RowOutOfBounds(
            u32::MAX,
            MAX_ROWS,
        )));
    }

    let mut out = Worksheet::new(src.name());

    for (dst, instance) in plan.iter().enumerate() {
        let dst = dst as u32;
        for (col, data) in src.iter_row(instance.src) {
            out.set_cell_at(dst, col, data.clone())?;
        }
        out.set_row_height(dst, src.row_height(instance.src));
        out.set_row_hidden(dst, src.is_row_hidden(instance.src));
    }

    for (col, width) in src.custom_column_widths() {
        out.set_column_width(col, width);
    }
    for col in src.hidden_columns() {
        out.set_column_hidden(col, true);
    }
    for range in rebase_regions(Axis::Row, src.merged_regions(), plan)? {
        out.merge_cells(range)?;
    }
    Ok(out)
}

/// Rebase merged regions through a plan on one axis.
///
/// Every appearance of a region's first source line must begin a complete
/// consecutive run of its lines; each run yields one rebased copy.
fn rebase_regions(
    axis: Axis,
    regions: &[CellRange],
    plan: &[AxisInstance],
) -> Result<Vec<CellRange>> {
    let mut out = Vec::new();
    for region in regions {
        let (first, last) = match axis {
            Axis::Row => (region.start.row, region.end.row),
            Axis::Column => (region.start.col as u32, region.end.col as u32),
        };
        let span = (last - first + 1) as usize;

        let mut j = 0;
        while j < plan.len() {
            let src = plan[j].src;
            if src < first || src > last {
                j += 1;
                continue;
            }
            let full_run = src == first
                && j + span <= plan.len()
                && (0..span).all(|k| plan[j + k].src == first + k as u32);
            if !full_run {
                return Err(Error::MergeAcrossBoundary {
                    axis,
                    range: region.to_a1_string(),
                });
            }
            out.push(match axis {
                Axis::Row => CellRange::from_indices(
                    j as u32,
                    region.start.col,
                    (j + span - 1) as u32,
                    region.end.col,
                ),
                Axis::Column => CellRange::from_indices(
                    region.start.row,
                    j as u16,
                    region.end.row,
                    (j + span - 1) as u16,
                ),
            });
            j += span;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::loop_meta;
    use minijinja::value::Value;
    use pretty_assertions::assert_eq;

    fn plain(src: u32) -> AxisInstance {
        AxisInstance {
            src,
            bindings: Vec::new(),
            meta: None,
        }
    }

    fn looped(src: u32, var: &str, value: i64, index0: usize, length: usize) -> AxisInstance {
        AxisInstance {
            src,
            bindings: vec![(var.to_string(), Value::from(value))],
            meta: Some(loop_meta(index0, length)),
        }
    }

    #[test]
    fn test_materialize_columns_moves_cells_and_tags() {
        let mut src = Worksheet::new("t");
        src.set_cell_value("A1", "label").unwrap();
        src.set_cell_value("C1", "{{ q }}").unwrap();
        src.set_cell_style_index_at(0, 2, 5).unwrap();
        src.set_column_width(2, 20.0);
        src.set_row_height(0, 30.0);

        // column 0 kept, column 2 repeated twice by a loop
        let plan = vec![
            plain(0),
            looped(2, "q", 10, 0, 2),
            looped(2, "q", 20, 1, 2),
        ];
        let (out, tags) = materialize_columns(&src, &plan).unwrap();

        assert_eq!(out.get_value_at(0, 0).as_string(), Some("label"));
        assert_eq!(out.get_value_at(0, 1).as_string(), Some("{{ q }}"));
        assert_eq!(out.get_value_at(0, 2).as_string(), Some("{{ q }}"));
        assert_eq!(out.cell_style_index_at(0, 1), 5);
        assert_eq!(out.cell_style_index_at(0, 2), 5);
        assert_eq!(out.column_width(1), 20.0);
        assert_eq!(out.column_width(2), 20.0);
        assert_eq!(out.row_height(0), 30.0);

        assert!(tags[0].is_none());
        let tag = tags[2].as_ref().unwrap();
        assert_eq!(tag.bindings[0].1.as_i64(), Some(20));
        assert!(tag.in_loop());
    }

    #[test]
    fn test_materialize_rows_carries_dimensions() {
        let mut src = Worksheet::new("t");
        src.set_cell_value("A3", "body").unwrap();
        src.set_row_height(2, 25.0);
        src.set_row_hidden(2, true);
        src.set_column_width(0, 12.0);

        let plan = vec![plain(2), plain(2)];
        let out = materialize_rows(&src, &plan).unwrap();

        assert_eq!(out.get_value_at(0, 0).as_string(), Some("body"));
        assert_eq!(out.get_value_at(1, 0).as_string(), Some("body"));
        assert_eq!(out.row_height(1), 25.0);
        assert!(out.is_row_hidden(1));
        assert_eq!(out.column_width(0), 12.0);
    }

    #[test]
    fn test_style_index_copied_to_row_duplicates() {
        let mut src = Worksheet::new("t");
        src.set_cell_value("A2", "{{ x }}").unwrap();
        src.set_cell_style_index_at(1, 0, 7).unwrap();

        let plan = vec![plain(1), plain(1), plain(1)];
        let out = materialize_rows(&src, &plan).unwrap();
        for row in 0..3 {
            assert_eq!(out.cell_style_index_at(row, 0), 7);
        }
    }

    #[test]
    fn test_merged_region_repeats_with_loop() {
        let mut src = Worksheet::new("t");
        src.set_cell_value("A2", "x").unwrap();
        // region spans rows 1..=2, fully inside a loop body
        src.merge_cells(CellRange::parse("A2:B3").unwrap()).unwrap();

        let plan = vec![plain(0), plain(1), plain(2), plain(1), plain(2)];
        let out = materialize_rows(&src, &plan).unwrap();
        let regions = out.merged_regions();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].to_a1_string(), "A2:B3");
        assert_eq!(regions[1].to_a1_string(), "A4:B5");
    }

    #[test]
    fn test_merged_region_dropped_when_lines_vanish() {
        let mut src = Worksheet::new("t");
        src.set_cell_value("A1", "x").unwrap();
        src.merge_cells(CellRange::parse("A2:B3").unwrap()).unwrap();

        let plan = vec![plain(0)];
        let out = materialize_rows(&src, &plan).unwrap();
        assert!(out.merged_regions().is_empty());
    }

    #[test]
    fn test_merged_region_straddling_boundary_errors() {
        let mut src = Worksheet::new("t");
        src.set_cell_value("A1", "x").unwrap();
        src.merge_cells(CellRange::parse("A2:B3").unwrap()).unwrap();

        // row 2 survives, row 3 does not
        let plan = vec![plain(0), plain(1)];
        let err = materialize_rows(&src, &plan).unwrap_err();
        assert!(matches!(err, Error::MergeAcrossBoundary { .. }));
        assert!(err.is_structural());
    }

    #[test]
    fn test_column_merge_rebased() {
        let mut src = Worksheet::new("t");
        src.set_cell_value("B1", "h").unwrap();
        src.merge_cells(CellRange::parse("B1:C1").unwrap()).unwrap();

        // columns 1..=2 shifted left by one
        let plan = vec![plain(1), plain(2)];
        let (out, _) = materialize_columns(&src, &plan).unwrap();
        assert_eq!(out.merged_regions()[0].to_a1_string(), "A1:B1");
    }
}
