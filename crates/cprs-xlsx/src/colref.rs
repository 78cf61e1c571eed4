//! `A1`-style column reference codec.

use crate::WorkbookError;

/// Highest column a worksheet can address (`XFD`).
pub const MAX_COLUMN: u32 = 16_384;

/// Convert column letters (`A`, `bc`, `XFD`) to their 1-based index.
pub fn column_index(letters: &str) -> Result<u32, WorkbookError> {
    if letters.is_empty() {
        return Err(WorkbookError::InvalidColumnReference(letters.to_string()));
    }
    let mut index: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(WorkbookError::InvalidColumnReference(letters.to_string()));
        }
        let digit = (ch.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        index = index
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| WorkbookError::InvalidColumnReference(letters.to_string()))?;
    }
    Ok(index)
}

/// Convert a 1-based column index back to letters (`1` yields `A`).
pub fn column_letters(index: u32) -> Result<String, WorkbookError> {
    if index == 0 {
        return Err(WorkbookError::InvalidColumnReference(index.to_string()));
    }
    let mut index = index;
    let mut letters = String::new();
    while index > 0 {
        let rem = ((index - 1) % 26) as u8;
        letters.insert(0, (b'A' + rem) as char);
        index = (index - 1) / 26;
    }
    Ok(letters)
}

/// Column index of a cell reference (`D5` yields 4).
///
/// Only the leading letters are interpreted; a reference with no leading
/// letters is invalid.
pub fn cell_column(cell_ref: &str) -> Result<u32, WorkbookError> {
    let letters: String = cell_ref
        .chars()
        .take_while(|ch| ch.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return Err(WorkbookError::InvalidColumnReference(cell_ref.to_string()));
    }
    column_index(&letters)
}
