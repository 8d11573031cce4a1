//! Directive scanning
//!
//! Finds structural markers embedded in cell content and classifies them by
//! axis and kind. Marker syntax follows the jinja block form:
//!
//! - row axis: `{% for x in items %}` / `{% endfor %}`, `{% if cond %}` / `{% endif %}`
//! - column axis: `{%col for x in items %}` / `{%col endfor %}`, and the `if` pair
//!
//! A directive consumes its entire row (row axis) or column (column axis):
//! the only other content allowed there is an identical copy of the same
//! marker, which legitimately appears when column expansion clones a
//! row-directive cell into several columns.

use std::fmt;

use gridtpl_core::{CellAddress, CellValue, Worksheet};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

/// Matches a cell whose entire value is a single block marker, capturing the
/// optional `col` axis prefix and the marker body.
static BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*\{%-?\s*(col\s+)?(.*?)\s*-?%\}\s*$").unwrap());

/// Parses a loop-open payload: `for <name> in <expr>`
static FOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^for\s+(\w+)\s+in\s+(.+)$").unwrap());

/// Parses a conditional-open payload: `if <expr>`
static IF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^if\s+(.+)$").unwrap());

/// The axis a directive applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Vertical expansion: blocks span row ranges
    Row,
    /// Horizontal expansion: blocks span column ranges
    Column,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
        }
    }
}

/// The kind of a parsed directive
#[derive(Debug, Clone, PartialEq)]
pub enum DirectiveKind {
    /// `for <var> in <iterable>`
    LoopOpen { var: String, iterable: String },
    /// `endfor`
    LoopClose,
    /// `if <condition>`
    CondOpen { condition: String },
    /// `endif`
    CondClose,
}

impl DirectiveKind {
    /// True for `for`/`if`, false for `endfor`/`endif`
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            DirectiveKind::LoopOpen { .. } | DirectiveKind::CondOpen { .. }
        )
    }

    /// True if `self` is the closing counterpart of `open`
    pub fn closes(&self, open: &DirectiveKind) -> bool {
        matches!(
            (self, open),
            (DirectiveKind::LoopClose, DirectiveKind::LoopOpen { .. })
                | (DirectiveKind::CondClose, DirectiveKind::CondOpen { .. })
        )
    }

    /// The bare tag name, for diagnostics
    pub fn tag_name(&self) -> &'static str {
        match self {
            DirectiveKind::LoopOpen { .. } => "for",
            DirectiveKind::LoopClose => "endfor",
            DirectiveKind::CondOpen { .. } => "if",
            DirectiveKind::CondClose => "endif",
        }
    }

    /// The tag name of the expected closing counterpart of an open directive
    pub fn expected_close(&self) -> &'static str {
        match self {
            DirectiveKind::LoopOpen { .. } => "endfor",
            DirectiveKind::CondOpen { .. } => "endif",
            _ => "",
        }
    }
}

/// A directive extracted from a cell
#[derive(Debug, Clone)]
pub struct Directive {
    /// Axis the directive applies to
    pub axis: Axis,
    /// What the directive does
    pub kind: DirectiveKind,
    /// Index on the axis: the row (row axis) or column (column axis)
    pub index: u32,
    /// Source cell row, for diagnostics
    pub row: u32,
    /// Source cell column, for diagnostics
    pub col: u16,
    /// Original marker text, for diagnostics
    pub text: String,
}

/// Classification of a cell's content with respect to directive markers
enum Marker {
    /// Not a block marker
    NotADirective,
    /// A recognized directive
    Directive(Axis, DirectiveKind),
    /// Block-shaped marker whose `for`/`if` payload does not parse
    Invalid,
}

fn classify_marker(text: &str) -> Marker {
    let Some(caps) = BLOCK_RE.captures(text) else {
        return Marker::NotADirective;
    };
    let axis = if caps.get(1).is_some() {
        Axis::Column
    } else {
        Axis::Row
    };
    let inner = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    // A cell holding several tags (inline `{% if %}...{% endif %}` templates)
    // is rendered content, not a structural marker.
    if inner.contains("%}") || inner.contains("{%") || inner.contains("{{") {
        return Marker::NotADirective;
    }

    if let Some(fc) = FOR_RE.captures(inner) {
        return Marker::Directive(
            axis,
            DirectiveKind::LoopOpen {
                var: fc[1].to_string(),
                iterable: fc[2].trim().to_string(),
            },
        );
    }
    if inner == "endfor" {
        return Marker::Directive(axis, DirectiveKind::LoopClose);
    }
    if let Some(ic) = IF_RE.captures(inner) {
        return Marker::Directive(
            axis,
            DirectiveKind::CondOpen {
                condition: ic[1].trim().to_string(),
            },
        );
    }
    if inner == "endif" {
        return Marker::Directive(axis, DirectiveKind::CondClose);
    }
    if inner == "for" || inner.starts_with("for ") || inner == "if" {
        // Block tag shape with a broken binding/condition payload
        return Marker::Invalid;
    }
    Marker::NotADirective
}

/// Scan a sheet for directives on one axis, in document order
///
/// Row-axis scanning is row-major (the first marker cell of each row wins);
/// column-axis scanning is column-major. Each directive's row/column must not
/// contain other meaningful content.
pub fn scan(sheet: &Worksheet, axis: Axis) -> Result<Vec<Directive>> {
    let Some((_, _, max_row, max_col)) = sheet.used_bounds() else {
        return Ok(Vec::new());
    };

    let mut directives = Vec::new();
    match axis {
        Axis::Row => {
            for row in 0..=max_row {
                if let Some(directive) = scan_line(sheet, axis, row, sheet.iter_row(row))? {
                    directives.push(directive);
                }
            }
        }
        Axis::Column => {
            for col in 0..=max_col {
                if let Some(directive) = scan_col_line(sheet, col, sheet.iter_col(col))? {
                    directives.push(directive);
                }
            }
        }
    }
    Ok(directives)
}

fn scan_line<'a>(
    sheet: &'a Worksheet,
    axis: Axis,
    row: u32,
    cells: impl Iterator<Item = (u16, &'a gridtpl_core::CellData)>,
) -> Result<Option<Directive>> {
    for (col, data) in cells {
        let CellValue::String(text) = &data.value else {
            continue;
        };
        match classify_marker(text) {
            Marker::Directive(a, kind) if a == axis => {
                let directive = Directive {
                    axis,
                    kind,
                    index: row,
                    row,
                    col,
                    text: text.trim().to_string(),
                };
                check_exclusive(
                    axis,
                    row,
                    &directive.text,
                    sheet.iter_row(row).map(|(c, d)| (row, c, d)),
                    (row, col),
                )?;
                return Ok(Some(directive));
            }
            Marker::Invalid => {
                return Err(Error::InvalidDirective {
                    cell: CellAddress::new(row, col).to_a1_string(),
                    text: text.trim().to_string(),
                });
            }
            _ => {}
        }
    }
    Ok(None)
}

fn scan_col_line<'a>(
    sheet: &'a Worksheet,
    col: u16,
    cells: impl Iterator<Item = (u32, &'a gridtpl_core::CellData)>,
) -> Result<Option<Directive>> {
    for (row, data) in cells {
        let CellValue::String(text) = &data.value else {
            continue;
        };
        match classify_marker(text) {
            Marker::Directive(Axis::Column, kind) => {
                let directive = Directive {
                    axis: Axis::Column,
                    kind,
                    index: col as u32,
                    row,
                    col,
                    text: text.trim().to_string(),
                };
                check_exclusive(
                    Axis::Column,
                    col as u32,
                    &directive.text,
                    sheet.iter_col(col).map(|(r, d)| (r, col, d)),
                    (row, col),
                )?;
                return Ok(Some(directive));
            }
            Marker::Invalid => {
                return Err(Error::InvalidDirective {
                    cell: CellAddress::new(row, col).to_a1_string(),
                    text: text.trim().to_string(),
                });
            }
            _ => {}
        }
    }
    Ok(None)
}

/// Verify a directive's row/column holds nothing but the marker (or exact
/// duplicates of it).
fn check_exclusive<'a>(
    axis: Axis,
    index: u32,
    marker_text: &str,
    cells: impl Iterator<Item = (u32, u16, &'a gridtpl_core::CellData)>,
    marker_pos: (u32, u16),
) -> Result<()> {
    for (row, col, data) in cells {
        if (row, col) == marker_pos {
            continue;
        }
        let meaningful = match &data.value {
            CellValue::Empty => false,
            CellValue::String(s) => {
                let t = s.trim();
                !t.is_empty() && t != marker_text
            }
            _ => true,
        };
        if meaningful {
            return Err(Error::DirectiveNotAlone {
                axis,
                index,
                cell: CellAddress::new(row, col).to_a1_string(),
            });
        }
    }
    Ok(())
}

/// True if the content contains any `{{ }}` or `{% %}` tag
pub fn has_template_tag(content: &str) -> bool {
    static TAG_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?s)\{\{.*?\}\}|\{%.*?%\}").unwrap());
    TAG_RE.is_match(content)
}

/// If the content is exactly one `{{ expr }}` tag, return the inner expression
pub fn pure_expression(content: &str) -> Option<&str> {
    let trimmed = content.trim();
    let inner = trimmed.strip_prefix("{{")?.strip_suffix("}}")?;
    if inner.contains("{{") || inner.contains("}}") || inner.contains("{%") {
        return None;
    }
    Some(inner.trim())
}
