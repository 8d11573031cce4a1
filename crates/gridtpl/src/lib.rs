//! # gridtpl
//!
//! A template engine for grid documents. Templates are ordinary worksheets
//! whose cells may embed expressions (`{{ ... }}`) and structural
//! directives: `{% for %}`/`{% if %}` blocks expand along the row axis,
//! `{%col for %}`/`{%col if %}` blocks along the column axis. Column
//! expansion always runs before row expansion, so a single sheet can pivot
//! data across both axes at once.
//!
//! ## Example
//!
//! ```rust
//! use gridtpl::prelude::*;
//! use minijinja::context;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", "Invoice {{ number }}").unwrap();
//! sheet.set_cell_value("A2", "{% for line in lines %}").unwrap();
//! sheet.set_cell_value("A3", "{{ line.item }}").unwrap();
//! sheet.set_cell_value("B3", "{{ line.total }}").unwrap();
//! sheet.set_cell_value("A4", "{% endfor %}").unwrap();
//!
//! let template = Template::new();
//! let rendered = template
//!     .render(&workbook, context! {
//!         number => "2024-001",
//!         lines => vec![
//!             context! { item => "widget", total => 12.5 },
//!             context! { item => "gadget", total => 40.0 },
//!         ],
//!     })
//!     .unwrap();
//!
//! let sheet = rendered.worksheet(0).unwrap();
//! assert_eq!(sheet.get_value("B2").unwrap(), CellValue::Number(12.5));
//! ```

pub mod prelude;
pub mod template;

pub use template::Template;

// Re-export document model types
pub use gridtpl_core::{
    CellAddress, CellData, CellRange, CellValue, Grid, Workbook, Worksheet, MAX_COLS, MAX_ROWS,
};

// Re-export engine types
pub use gridtpl_engine::{Axis, ColumnTag, Engine, Error, Result};

// Re-export the expression machinery so filters and context data can be
// built without depending on minijinja directly
pub use minijinja::{context, value::Value, Environment};
