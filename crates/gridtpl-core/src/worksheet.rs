//! Worksheet type

use crate::cell::{CellAddress, CellData, CellRange, CellValue};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::{MAX_COLS, MAX_ROWS};

/// A worksheet (single sheet in a workbook)
#[derive(Debug, Clone)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Cell and dimension storage
    grid: Grid,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            grid: Grid::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    // === Cell Access ===

    /// Get a cell by address string (e.g., "A1")
    pub fn cell(&self, address: &str) -> Result<Option<&CellData>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.grid.get(addr.row, addr.col))
    }

    /// Get a cell by row and column indices
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.grid.get(row, col)
    }

    /// Get cell value (convenience method)
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get cell value by indices
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.grid
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or(CellValue::Empty)
    }

    /// Get a cell's style index, 0 if the cell does not exist
    pub fn cell_style_index_at(&self, row: u32, col: u16) -> u32 {
        self.grid.get(row, col).map(|c| c.style_index).unwrap_or(0)
    }

    // === Cell Modification ===

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by row and column indices
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.grid.set_value(row, col, value.into());
        Ok(())
    }

    /// Set full cell data (value and style) by row and column indices
    pub fn set_cell_at(&mut self, row: u32, col: u16, data: CellData) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.grid.set(row, col, data);
        Ok(())
    }

    /// Set a cell's style index, creating the cell if needed
    pub fn set_cell_style_index_at(&mut self, row: u32, col: u16, style_index: u32) -> Result<()> {
        self.validate_cell_position(row, col)?;
        if let Some(cell) = self.grid.get_mut(row, col) {
            cell.style_index = style_index;
        } else if style_index != 0 {
            self.grid
                .set(row, col, CellData::with_style(CellValue::Empty, style_index));
        }
        Ok(())
    }

    /// Clear a cell by indices
    pub fn clear_cell_at(&mut self, row: u32, col: u16) {
        self.grid.remove(row, col);
    }

    // === Iteration and bounds ===

    /// Get the used range bounds: (min_row, min_col, max_row, max_col)
    pub fn used_bounds(&self) -> Option<(u32, u16, u32, u16)> {
        self.grid.used_bounds()
    }

    /// Get the number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.grid.cell_count()
    }

    /// Check if the worksheet is empty
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Iterate over all non-empty cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.grid.iter()
    }

    /// Iterate over non-empty cells of one row
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.grid.iter_row(row)
    }

    /// Iterate over non-empty cells of one column, in row order
    pub fn iter_col(&self, col: u16) -> impl Iterator<Item = (u32, &CellData)> + '_ {
        self.grid.iter_col(col)
    }

    // === Row/Column dimensions ===

    /// Get row height
    pub fn row_height(&self, row: u32) -> f64 {
        self.grid.row_height(row)
    }

    /// Set row height
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.grid.set_row_height(row, height);
    }

    /// Check if row is hidden
    pub fn is_row_hidden(&self, row: u32) -> bool {
        self.grid.is_row_hidden(row)
    }

    /// Set row hidden state
    pub fn set_row_hidden(&mut self, row: u32, hidden: bool) {
        self.grid.set_row_hidden(row, hidden);
    }

    /// Get column width
    pub fn column_width(&self, col: u16) -> f64 {
        self.grid.column_width(col)
    }

    /// Set column width
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.grid.set_column_width(col, width);
    }

    /// Check if column is hidden
    pub fn is_column_hidden(&self, col: u16) -> bool {
        self.grid.is_column_hidden(col)
    }

    /// Set column hidden state
    pub fn set_column_hidden(&mut self, col: u16, hidden: bool) {
        self.grid.set_column_hidden(col, hidden);
    }

    /// Iterate rows with a custom height
    pub fn custom_row_heights(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.grid.custom_row_heights()
    }

    /// Iterate hidden rows
    pub fn hidden_rows(&self) -> impl Iterator<Item = u32> + '_ {
        self.grid.hidden_rows()
    }

    /// Iterate columns with a custom width
    pub fn custom_column_widths(&self) -> impl Iterator<Item = (u16, f64)> + '_ {
        self.grid.custom_column_widths()
    }

    /// Iterate hidden columns
    pub fn hidden_columns(&self) -> impl Iterator<Item = u16> + '_ {
        self.grid.hidden_columns()
    }

    // === Merged Cells ===

    /// Get merged regions
    pub fn merged_regions(&self) -> &[CellRange] {
        self.grid.merged_regions()
    }

    /// Merge cells
    pub fn merge_cells(&mut self, range: CellRange) -> Result<()> {
        for existing in self.grid.merged_regions() {
            if range.overlaps(existing) {
                return Err(Error::MergedCellConflict(range.to_string()));
            }
        }
        self.grid.add_merged_region(range);
        Ok(())
    }

    /// Unmerge cells; returns true if the exact range was merged
    pub fn unmerge_cells(&mut self, range: &CellRange) -> bool {
        let found = self
            .grid
            .merged_regions()
            .iter()
            .position(|existing| existing == range);

        if let Some(i) = found {
            self.grid.remove_merged_region(i);
            true
        } else {
            false
        }
    }

    // === Internal ===

    fn validate_cell_position(&self, row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_worksheet() {
        let ws = Worksheet::new("Test");
        assert_eq!(ws.name(), "Test");
        assert!(ws.is_empty());
    }

    #[test]
    fn test_set_cell_values() {
        let mut ws = Worksheet::new("Test");

        ws.set_cell_value("A1", "Hello").unwrap();
        ws.set_cell_value("B1", 42.0).unwrap();
        ws.set_cell_value("C1", true).unwrap();

        assert_eq!(ws.get_value("A1").unwrap().as_string(), Some("Hello"));
        assert_eq!(ws.get_value("B1").unwrap().as_number(), Some(42.0));
        assert_eq!(ws.get_value("C1").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn test_used_bounds() {
        let mut ws = Worksheet::new("Test");

        assert!(ws.used_bounds().is_none());

        ws.set_cell_value_at(5, 3, "A").unwrap();
        ws.set_cell_value_at(10, 7, "B").unwrap();

        assert_eq!(ws.used_bounds(), Some((5, 3, 10, 7)));
    }

    #[test]
    fn test_merge_cells() {
        let mut ws = Worksheet::new("Test");

        ws.merge_cells(CellRange::parse("A1:C3").unwrap()).unwrap();
        assert_eq!(ws.merged_regions().len(), 1);

        // Can't merge overlapping
        assert!(ws.merge_cells(CellRange::parse("B2:D4").unwrap()).is_err());

        assert!(ws.unmerge_cells(&CellRange::parse("A1:C3").unwrap()));
        assert!(ws.merged_regions().is_empty());
    }

    #[test]
    fn test_style_index() {
        let mut ws = Worksheet::new("Test");
        ws.set_cell_value("A1", "x").unwrap();
        ws.set_cell_style_index_at(0, 0, 7).unwrap();
        assert_eq!(ws.cell_style_index_at(0, 0), 7);

        // Style on an otherwise empty cell still creates it
        ws.set_cell_style_index_at(3, 3, 2).unwrap();
        assert_eq!(ws.cell_style_index_at(3, 3), 2);
    }
}
