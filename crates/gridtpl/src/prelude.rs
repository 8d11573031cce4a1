//! Prelude module - common imports for gridtpl users
//!
//! ```rust
//! use gridtpl::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellAddress,
    CellData,
    CellRange,
    CellValue,
    // Engine types
    Engine,
    // Error types
    Error,
    Result,
    // Main types
    Template,
    Workbook,
    Worksheet,
};
