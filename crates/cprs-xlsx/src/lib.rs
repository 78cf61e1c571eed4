//! Extraction of CPRS vendor workbooks into normalized tables.
//!
//! The pipeline reads raw SpreadsheetML instead of going through a
//! spreadsheet engine: a workbook ([`cprs_opc::Package`]) is opened, the
//! target worksheet is resolved through the workbook relationships, its
//! cells are decoded into a sparse [`Grid`] against the shared string table,
//! and the vendor-specific assemblers walk that grid.
//!
//! Two workbook kinds are supported:
//!
//! - clearing-house reports ([`clearing_house`]): heuristic header
//!   discovery, segment markers splitting the sheet into per-program blocks,
//!   one record per counterparty row;
//! - FCM reports ([`fcm`]): fixed-column sections located by marker rows.
//!
//! Layout heuristics are driven by const alias tables; all failures surface
//! as [`WorkbookError`].

mod cells;
pub mod clearing_house;
pub mod colref;
mod error;
pub mod fcm;
pub mod grid;
pub mod header;
pub mod segments;
pub mod sheets;
pub mod strings;

pub use clearing_house::{
    parse_clearing_house, parse_clearing_house_file, CLEARING_HOUSE_COLUMNS,
};
pub use colref::{cell_column, column_index, column_letters, MAX_COLUMN};
pub use error::WorkbookError;
pub use fcm::{
    parse_fcm_totals, parse_fcm_totals_file, parse_futures_detail, parse_futures_detail_file,
    FCM_TOTALS_COLUMNS, FUTURES_DETAIL_COLUMNS,
};
pub use grid::Grid;
pub use header::{build_header_map, find_header_row, HeaderMap, HEADER_SCAN_LIMIT};
pub use segments::{
    scan_segments, segment_ranges, validate_segments, SegmentKind, SegmentMarker, SegmentRange,
    Variant,
};
pub use sheets::{first_sheet, list_sheets, sheet_matching, ResolvedSheet, SheetRef};
pub use strings::SharedStrings;
