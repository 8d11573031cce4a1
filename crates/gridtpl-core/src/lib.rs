//! # gridtpl-core
//!
//! In-memory grid document model for the gridtpl template engine.
//!
//! This crate provides the document structures the expansion engine reads and
//! rebuilds:
//! - [`CellValue`] - Typed cell values (numbers, strings, booleans, dates, formulas)
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`Worksheet`], [`Workbook`] - The main document structures, including
//!   row heights, column widths, hidden flags, and merged regions
//!
//! There is no file I/O here; loading and saving a concrete container format
//! is the responsibility of the caller.
//!
//! ## Example
//!
//! ```rust
//! use gridtpl_core::{Workbook, CellValue};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! // Using string addresses
//! sheet.set_cell_value("A1", "Hello").unwrap();
//! sheet.set_cell_value("B1", 42.0).unwrap();
//!
//! // Or using row/column indices (0-based)
//! sheet.set_cell_value_at(1, 0, CellValue::String("World".into())).unwrap();
//! ```

pub mod cell;
pub mod error;
pub mod grid;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{CellAddress, CellData, CellRange, CellValue};
pub use error::{Error, Result};
pub use grid::Grid;
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet
pub const MAX_COLS: u16 = 16_384;
