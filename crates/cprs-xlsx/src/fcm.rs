//! FCM workbook extraction: the per-counterparty totals block and the
//! futures detail block, both keyed off marker rows in a fixed label column.

use std::path::Path;

use cprs_model::{Table, Value};
use cprs_opc::Package;

use crate::cells::{is_summary_label, label, label_lower, number};
use crate::grid::Grid;
use crate::segments::Variant;
use crate::sheets::{self, ResolvedSheet};
use crate::strings::SharedStrings;
use crate::WorkbookError;

/// Sheet-title fragments that identify the FCM worksheet.
pub const FCM_SHEET_ALIASES: [&str; 3] = ["cprs - fcm", "futures - fcm", "cprs-fcm"];

/// Output columns of the totals table.
pub const FCM_TOTALS_COLUMNS: [&str; 8] = [
    "counterparty",
    "TIPS",
    "Treasury",
    "Equity",
    "Commodity",
    "Currency",
    "Notional",
    "NotionalChange",
];

/// Output columns of the futures detail table.
pub const FUTURES_DETAIL_COLUMNS: [&str; 6] = [
    "account",
    "description",
    "class",
    "fcm",
    "clearing_house",
    "notional",
];

// Section markers, matched as substrings of the label column's text.
const TOTALS_MARKER: &str = "total by counterparty/ fcm";
const FUTURES_MARKER: &str = "futures detail";
const TREND_FOOTER: &str = "risk exclusive of the trend positions";

/// Column carrying section markers and row labels.
const LABEL_COLUMN: u32 = 3;

pub fn parse_fcm_totals_file(path: impl AsRef<Path>) -> Result<Table, WorkbookError> {
    let path = path.as_ref();
    let package = Package::open(path)?;
    parse_fcm_totals(&package, &source_name(path))
}

pub fn parse_futures_detail_file(path: impl AsRef<Path>) -> Result<Table, WorkbookError> {
    let path = path.as_ref();
    let package = Package::open(path)?;
    parse_futures_detail(&package, &source_name(path))
}

/// Extract the `total by counterparty/ fcm` block.
///
/// Trend workbooks carry no totals section; a missing marker likewise yields
/// an empty table rather than an error.
pub fn parse_fcm_totals(package: &Package, source_name: &str) -> Result<Table, WorkbookError> {
    let (sheet, grid) = load_fcm_sheet(package)?;
    let variant = Variant::infer(source_name, &sheet.name);
    let mut table = Table::new(FCM_TOTALS_COLUMNS);
    if variant == Variant::Trend {
        return Ok(table);
    }
    let Some((start, end)) = totals_section(&grid) else {
        return Ok(table);
    };

    for row in start..=end {
        let counterparty = label(&grid, row, LABEL_COLUMN);
        if is_summary_label(&counterparty) {
            continue;
        }
        let tips = number(&grid, row, 5, "TIPS")?;
        let treasury = number(&grid, row, 6, "Treasury")?;
        let equity = number(&grid, row, 7, "Equity")?;
        let commodity = number(&grid, row, 8, "Commodity")?;
        let currency = number(&grid, row, 9, "Currency")?;
        let notional = number(&grid, row, 11, "Notional")?;
        let change = number(&grid, row, 12, "NotionalChange")?;
        // Placeholder lines render as zero across the board; real positions
        // never do.
        if notional == 0.0
            && tips == 0.0
            && treasury == 0.0
            && equity == 0.0
            && commodity == 0.0
            && currency == 0.0
        {
            continue;
        }
        table.push_row(vec![
            Value::text(counterparty),
            Value::Number(tips),
            Value::Number(treasury),
            Value::Number(equity),
            Value::Number(commodity),
            Value::Number(currency),
            Value::Number(notional),
            Value::Number(change),
        ])?;
    }
    Ok(table)
}

/// Extract the `futures detail` block.
///
/// Ex-trend workbooks carry no futures detail; a missing marker yields an
/// empty table.
pub fn parse_futures_detail(package: &Package, source_name: &str) -> Result<Table, WorkbookError> {
    let (sheet, grid) = load_fcm_sheet(package)?;
    let variant = Variant::infer(source_name, &sheet.name);
    let mut table = Table::new(FUTURES_DETAIL_COLUMNS);
    if variant == Variant::ExTrend {
        return Ok(table);
    }
    let Some((start, end)) = futures_section(&grid) else {
        return Ok(table);
    };

    for row in start..=end {
        let account = label(&grid, row, 3);
        let description = label(&grid, row, 5);
        if account.is_empty() && description.is_empty() && label(&grid, row, 12).is_empty() {
            continue;
        }
        // Page breaks repeat the section header mid-table.
        if account.eq_ignore_ascii_case("account")
            && description.eq_ignore_ascii_case("description")
        {
            continue;
        }
        let notional = number(&grid, row, 12, "notional")?;
        table.push_row(vec![
            Value::text(account),
            Value::text(description),
            Value::text(label(&grid, row, 7)),
            Value::text(label(&grid, row, 8)),
            Value::text(label(&grid, row, 9)),
            Value::Number(notional),
        ])?;
    }
    Ok(table)
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn load_fcm_sheet(package: &Package) -> Result<(ResolvedSheet, Grid), WorkbookError> {
    let sheet = sheets::sheet_matching(package, &FCM_SHEET_ALIASES)?;
    let strings = SharedStrings::load(package)?;
    let xml = package.read_part(&sheet.part)?;
    let grid = Grid::decode(xml, &strings)?;
    Ok((sheet, grid))
}

/// Rows of the totals block: the row after the marker up to the row before
/// the futures detail marker or the trend footer, else the last used row.
fn totals_section(grid: &Grid) -> Option<(u32, u32)> {
    let marker = find_marker(grid, TOTALS_MARKER)?;
    let start = marker + 1;
    let end = grid
        .row_numbers()
        .filter(|&row| row > marker)
        .find(|&row| {
            let text = label_lower(grid, row, LABEL_COLUMN);
            text.contains(FUTURES_MARKER) || text.contains(TREND_FOOTER)
        })
        .map(|row| row - 1)
        .unwrap_or_else(|| grid.max_row());
    Some((start, end))
}

/// Rows of the futures detail block: the marker row is followed by one
/// header row, then data until the trend footer or the last used row.
fn futures_section(grid: &Grid) -> Option<(u32, u32)> {
    let marker = find_marker(grid, FUTURES_MARKER)?;
    let start = marker + 2;
    let end = grid
        .row_numbers()
        .filter(|&row| row > marker)
        .find(|&row| label_lower(grid, row, LABEL_COLUMN).contains(TREND_FOOTER))
        .map(|row| row - 1)
        .unwrap_or_else(|| grid.max_row());
    Some((start, end))
}

fn find_marker(grid: &Grid, marker: &str) -> Option<u32> {
    grid.row_numbers()
        .find(|&row| label_lower(grid, row, LABEL_COLUMN).contains(marker))
}
