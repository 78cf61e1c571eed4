use thiserror::Error;

use crate::text::collapse_ws;

/// Magnitude ceiling for extracted exposure figures.
///
/// Values beyond this indicate column misalignment in the source worksheet
/// rather than a legitimate position, so they are rejected instead of carried
/// into downstream rollups.
pub const MAX_ABS_VALUE: f64 = 1_000_000_000_000_000.0; // 1e15

#[derive(Debug, Error)]
pub enum NumberError {
    #[error("unable to parse numeric value {0:?}")]
    Parse(String),
    #[error("non-finite numeric value")]
    NonFinite,
    #[error("numeric value out of range: {0}")]
    OutOfRange(f64),
}

/// Tokens vendor files use for "no value". These coerce to `0.0`; anything
/// else that fails to parse is an error, so genuinely malformed cells are
/// never silently zeroed.
fn is_blank_token(text: &str) -> bool {
    matches!(text, "" | "-" | "--") || text.eq_ignore_ascii_case("n/a")
}

/// Coerce raw cell text to a float.
///
/// Handles the notations seen in vendor risk summaries: thousands separators,
/// currency and percent symbols, parenthesized (accounting) negatives, and
/// blank/placeholder tokens. The placeholder set is checked both before and
/// after symbol stripping so forms like `"$-"` still read as blank.
pub fn to_number(raw: &str) -> Result<f64, NumberError> {
    let text = collapse_ws(raw);
    if is_blank_token(&text) {
        return Ok(0.0);
    }

    let mut cleaned: String = text
        .chars()
        .filter(|ch| !matches!(ch, ',' | '$' | '%'))
        .collect();
    if is_blank_token(&cleaned) {
        return Ok(0.0);
    }

    if cleaned.starts_with('(') && cleaned.ends_with(')') {
        cleaned = format!("-{}", &cleaned[1..cleaned.len() - 1]);
    }

    cleaned
        .parse::<f64>()
        .map_err(|_| NumberError::Parse(text))
}

/// Reject non-finite values and magnitudes beyond [`MAX_ABS_VALUE`].
pub fn check_magnitude(value: f64) -> Result<f64, NumberError> {
    if !value.is_finite() {
        return Err(NumberError::NonFinite);
    }
    if value.abs() > MAX_ABS_VALUE {
        return Err(NumberError::OutOfRange(value));
    }
    Ok(value)
}
