//! Clearing-house workbook extraction: one normalized record per
//! counterparty row, tagged with the segment it sits under.

use std::path::Path;

use cprs_model::{check_magnitude, Table, Value};
use cprs_opc::Package;

use crate::cells::{is_summary_label, label, number};
use crate::grid::Grid;
use crate::header::{self, HeaderMap};
use crate::segments::{self, Variant};
use crate::sheets;
use crate::strings::SharedStrings;
use crate::WorkbookError;

/// Output columns, in emission order.
pub const CLEARING_HOUSE_COLUMNS: [&str; 12] = [
    "Segment",
    "Counterparty",
    "Cash",
    "TIPS",
    "Treasury",
    "Equity",
    "Commodity",
    "Currency",
    "Notional",
    "NotionalChangeFromPriorMonth",
    "AnnualizedVolatility",
    "SourceRow",
];

/// Exposure fields subject to the magnitude check, in output order.
const EXPOSURE_FIELDS: [&str; 7] = [
    "Cash",
    "TIPS",
    "Treasury",
    "Equity",
    "Commodity",
    "Currency",
    "Notional",
];

/// Trend statistics carried through without a magnitude check.
const TREND_FIELDS: [&str; 2] = ["NotionalChangeFromPriorMonth", "AnnualizedVolatility"];

/// Parse a clearing-house workbook from disk. The file name feeds variant
/// inference, so keep the vendor's original naming.
pub fn parse_clearing_house_file(path: impl AsRef<Path>) -> Result<Table, WorkbookError> {
    let path = path.as_ref();
    let source_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let package = Package::open(path)?;
    parse_clearing_house(&package, &source_name)
}

/// Parse a clearing-house workbook already loaded as a package.
///
/// The first sheet is the report. Its header block is discovered
/// heuristically, segment markers split the sheet into per-program blocks,
/// and each surviving row becomes one output record.
pub fn parse_clearing_house(package: &Package, source_name: &str) -> Result<Table, WorkbookError> {
    let sheet = sheets::first_sheet(package)?;
    let strings = SharedStrings::load(package)?;
    let xml = package.read_part(&sheet.part)?;
    let grid = Grid::decode(xml, &strings)?;

    let header_row =
        header::find_header_row(&grid).ok_or_else(|| WorkbookError::HeaderNotFound {
            sheet: sheet.name.clone(),
            limit: header::HEADER_SCAN_LIMIT,
        })?;
    let columns = header::build_header_map(&grid, header_row)?;

    let markers = segments::scan_segments(&grid);
    if markers.is_empty() {
        return Err(WorkbookError::NoSegments(sheet.name.clone()));
    }
    let variant = Variant::infer(source_name, &sheet.name);
    let markers = segments::validate_segments(markers, variant)?;
    let ranges = segments::segment_ranges(&markers, grid.max_row());

    let counterparty_col = columns
        .column("Counterparty")
        .ok_or(WorkbookError::MissingColumn("Counterparty"))?;

    let mut table = Table::new(CLEARING_HOUSE_COLUMNS);
    for range in &ranges {
        for row in (range.start_row + 1)..=range.end_row {
            let counterparty = label(&grid, row, counterparty_col);
            if is_summary_label(&counterparty) {
                continue;
            }

            let mut record = Vec::with_capacity(CLEARING_HOUSE_COLUMNS.len());
            record.push(Value::text(range.kind.label()));
            record.push(Value::text(counterparty));
            for field in EXPOSURE_FIELDS {
                let value = read_field(&grid, row, &columns, field)?;
                let value = check_magnitude(value)
                    .map_err(|source| WorkbookError::Numeric { field, row, source })?;
                record.push(Value::Number(value));
            }
            for field in TREND_FIELDS {
                record.push(Value::Number(read_field(&grid, row, &columns, field)?));
            }
            record.push(Value::Number(f64::from(row)));
            table.push_row(record)?;
        }
    }

    if table.is_empty() {
        return Err(WorkbookError::NoRows(sheet.name.clone()));
    }
    log::debug!(
        "clearing-house parse: {} row(s) across {} segment(s)",
        table.len(),
        ranges.len()
    );
    Ok(table)
}

/// Read a bound numeric field; unbound optional fields default to zero.
fn read_field(
    grid: &Grid,
    row: u32,
    columns: &HeaderMap,
    field: &'static str,
) -> Result<f64, WorkbookError> {
    match columns.column(field) {
        Some(column) => number(grid, row, column, field),
        None => Ok(0.0),
    }
}
