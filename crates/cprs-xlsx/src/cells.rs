//! Cell access helpers shared by the table assemblers.

use cprs_model::{collapse_ws, to_number};

use crate::grid::Grid;
use crate::WorkbookError;

/// Collapsed cell text, empty when the cell is absent.
pub(crate) fn label(grid: &Grid, row: u32, column: u32) -> String {
    collapse_ws(grid.cell(row, column).unwrap_or_default())
}

/// Lowercased collapsed cell text, for marker and alias matching.
pub(crate) fn label_lower(grid: &Grid, row: u32, column: u32) -> String {
    label(grid, row, column).to_lowercase()
}

/// Numeric cell value with row/field context on failure. Absent cells and
/// placeholder tokens read as zero.
pub(crate) fn number(
    grid: &Grid,
    row: u32,
    column: u32,
    field: &'static str,
) -> Result<f64, WorkbookError> {
    to_number(grid.cell(row, column).unwrap_or_default())
        .map_err(|source| WorkbookError::Numeric { field, row, source })
}

/// Label rows that carry summary noise rather than a record: blank labels
/// and `total`/`subtotal` lines.
pub(crate) fn is_summary_label(label: &str) -> bool {
    let lowered = label.to_lowercase();
    lowered.is_empty() || lowered == "total" || lowered == "subtotal"
}
