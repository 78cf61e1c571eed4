//! Header-row discovery and canonical column binding.
//!
//! Vendor workbooks move the header block around and split labels across two
//! stacked rows, so both steps are heuristic: a scorer picks the header row,
//! then each canonical field binds to the first column whose combined
//! two-row label matches one of its aliases.

use std::collections::{BTreeMap, BTreeSet};

use cprs_model::collapse_ws;

use crate::grid::Grid;
use crate::WorkbookError;

/// Rows inspected before header discovery gives up.
pub const HEADER_SCAN_LIMIT: u32 = 200;

/// Category labels counted toward the numeric-header signal. Matching is
/// exact: `cash` in a cell of its own, not as part of a longer phrase.
pub const NUMERIC_CATEGORY_LABELS: &[&str] =
    &["cash", "tips", "treasury", "equity", "commodity", "currency"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Combined label must equal an alias.
    Exact,
    /// Combined label must contain an alias.
    Substring,
}

pub struct FieldSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub mode: MatchMode,
}

impl FieldSpec {
    fn matches(&self, label: &str) -> bool {
        match self.mode {
            MatchMode::Exact => self.aliases.iter().any(|alias| label == *alias),
            MatchMode::Substring => self.aliases.iter().any(|alias| label.contains(alias)),
        }
    }
}

/// Canonical output fields in binding-priority order. `Notional` is
/// exact-match because its label is a substring of the change-from-prior
/// -month header.
pub const CANONICAL_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "Counterparty",
        aliases: &[
            "counterparty",
            "counterparty/ clearing house",
            "clearing house",
        ],
        mode: MatchMode::Substring,
    },
    FieldSpec {
        name: "Cash",
        aliases: &["cash"],
        mode: MatchMode::Substring,
    },
    FieldSpec {
        name: "TIPS",
        aliases: &["tips"],
        mode: MatchMode::Substring,
    },
    FieldSpec {
        name: "Treasury",
        aliases: &["treasury"],
        mode: MatchMode::Substring,
    },
    FieldSpec {
        name: "Equity",
        aliases: &["equity"],
        mode: MatchMode::Substring,
    },
    FieldSpec {
        name: "Commodity",
        aliases: &["commodity"],
        mode: MatchMode::Substring,
    },
    FieldSpec {
        name: "Currency",
        aliases: &["currency"],
        mode: MatchMode::Substring,
    },
    FieldSpec {
        name: "Notional",
        aliases: &["notional", "total notional"],
        mode: MatchMode::Exact,
    },
    FieldSpec {
        name: "NotionalChangeFromPriorMonth",
        aliases: &["notional change from prior month"],
        mode: MatchMode::Substring,
    },
    FieldSpec {
        name: "AnnualizedVolatility",
        aliases: &["annualized volatility"],
        mode: MatchMode::Substring,
    },
];

/// Canonical field name to 1-based column binding for one workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    bindings: BTreeMap<&'static str, u32>,
}

impl HeaderMap {
    pub fn column(&self, field: &str) -> Option<u32> {
        self.bindings.get(field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        self.bindings.iter().map(|(name, column)| (*name, *column))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[derive(Default)]
struct HeaderScore {
    has_counterparty: bool,
    has_notional: bool,
    categories: BTreeSet<&'static str>,
}

impl HeaderScore {
    fn observe(&mut self, label: &str) {
        if label.contains("counterparty") || label.contains("clearing house") {
            self.has_counterparty = true;
        }
        if label.contains("notional") {
            self.has_notional = true;
        }
        if let Some(&category) = NUMERIC_CATEGORY_LABELS.iter().find(|c| **c == label) {
            self.categories.insert(category);
        }
    }

    fn qualifies(&self) -> bool {
        self.has_notional && (self.has_counterparty || self.categories.len() >= 3)
    }
}

/// First row within the scan window that scores as a header row.
pub fn find_header_row(grid: &Grid) -> Option<u32> {
    for row in grid.row_numbers() {
        if row > HEADER_SCAN_LIMIT {
            break;
        }
        let Some(cells) = grid.row(row) else {
            continue;
        };
        let mut score = HeaderScore::default();
        for value in cells.values() {
            let label = collapse_ws(value).to_lowercase();
            if label.is_empty() {
                continue;
            }
            score.observe(&label);
        }
        if score.qualifies() {
            log::debug!("header row detected at {row}");
            return Some(row);
        }
    }
    None
}

/// Bind canonical fields to columns using the header row and the row below.
///
/// Columns are visited in ascending order; a column binds at most one field
/// and a bound field is never rebound. An unbound `Counterparty` falls back
/// to column 2; an unbound `Notional` is an error.
pub fn build_header_map(grid: &Grid, header_row: u32) -> Result<HeaderMap, WorkbookError> {
    let mut columns: BTreeSet<u32> = BTreeSet::new();
    if let Some(cells) = grid.row(header_row) {
        columns.extend(cells.keys().copied());
    }
    if let Some(cells) = grid.row(header_row + 1) {
        columns.extend(cells.keys().copied());
    }

    let mut bindings: BTreeMap<&'static str, u32> = BTreeMap::new();
    for &column in &columns {
        let combined = combined_label(grid, header_row, column);
        if combined.is_empty() {
            continue;
        }
        for field in CANONICAL_FIELDS {
            if bindings.contains_key(field.name) {
                continue;
            }
            if field.matches(&combined) {
                bindings.insert(field.name, column);
                break;
            }
        }
    }

    if !bindings.contains_key("Counterparty") {
        bindings.insert("Counterparty", 2);
    }
    if !bindings.contains_key("Notional") {
        return Err(WorkbookError::MissingColumn("Notional"));
    }
    Ok(HeaderMap { bindings })
}

/// The header cell and the cell directly below it, collapsed, joined with a
/// space when both are present, lowercased.
fn combined_label(grid: &Grid, header_row: u32, column: u32) -> String {
    let upper = collapse_ws(grid.cell(header_row, column).unwrap_or_default());
    let lower = collapse_ws(grid.cell(header_row + 1, column).unwrap_or_default());
    let mut combined = upper;
    if !lower.is_empty() {
        if !combined.is_empty() {
            combined.push(' ');
        }
        combined.push_str(&lower);
    }
    combined.to_lowercase()
}
