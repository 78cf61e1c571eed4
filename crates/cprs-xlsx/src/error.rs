use cprs_model::{NumberError, TableError};
use cprs_opc::PackageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error(transparent)]
    Package(#[from] PackageError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("invalid column reference: {0}")]
    InvalidColumnReference(String),
    #[error("workbook declares no worksheets")]
    NoSheets,
    #[error("no worksheet matches: {0}")]
    SheetNotFound(String),
    #[error("worksheet has no resolvable part: {0}")]
    UnresolvedSheet(String),
    #[error("unable to locate header row in sheet '{sheet}' (scanned first {limit} rows)")]
    HeaderNotFound { sheet: String, limit: u32 },
    #[error("workbook is missing required column: {0}")]
    MissingColumn(&'static str),
    #[error("no segment markers detected in sheet '{0}'")]
    NoSegments(String),
    #[error("missing expected segments: {}", .missing.join(", "))]
    MissingSegments { missing: Vec<String> },
    #[error("parser produced no rows from sheet '{0}'")]
    NoRows(String),
    #[error("{field} at row {row}: {source}")]
    Numeric {
        field: &'static str,
        row: u32,
        #[source]
        source: NumberError,
    },
    #[error("{0}")]
    Invalid(String),
}
