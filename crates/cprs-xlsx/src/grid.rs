use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;

use crate::colref::cell_column;
use crate::strings::SharedStrings;
use crate::WorkbookError;

/// Sparse worksheet contents decoded from raw SpreadsheetML.
///
/// Every stored value is the cell's text rendering: shared-string and inline
/// cells keep their text, boolean cells become `TRUE`/`FALSE`, and numeric
/// cells keep the raw `<v>` payload. Absent cells stay absent so blank and
/// zero remain distinguishable.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    rows: BTreeMap<u32, BTreeMap<u32, String>>,
}

impl Grid {
    pub fn decode(xml: &[u8], strings: &SharedStrings) -> Result<Self, WorkbookError> {
        let text = std::str::from_utf8(xml)?;
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut rows: BTreeMap<u32, BTreeMap<u32, String>> = BTreeMap::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) if e.local_name().as_ref() == b"row" => {
                    match row_number(&e)? {
                        Some(number) => {
                            let cells = read_row(&mut reader, strings)?;
                            if !cells.is_empty() {
                                rows.entry(number).or_default().extend(cells);
                            }
                        }
                        None => {
                            // A row with no `r` cannot be placed in the grid.
                            reader.read_to_end_into(e.name(), &mut Vec::new())?;
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(Self { rows })
    }

    /// Cell text at 1-based `(row, column)`, `None` when absent.
    pub fn cell(&self, row: u32, column: u32) -> Option<&str> {
        self.rows
            .get(&row)?
            .get(&column)
            .map(String::as_str)
    }

    pub fn row(&self, row: u32) -> Option<&BTreeMap<u32, String>> {
        self.rows.get(&row)
    }

    /// Populated row numbers, ascending.
    pub fn row_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.keys().copied()
    }

    /// Highest populated row, `0` for an empty sheet.
    pub fn max_row(&self) -> u32 {
        self.rows.keys().next_back().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn read_row(
    reader: &mut Reader<&[u8]>,
    strings: &SharedStrings,
) -> Result<BTreeMap<u32, String>, WorkbookError> {
    let mut buf = Vec::new();
    let mut cells = BTreeMap::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"c" => {
                let reference = attr_value(&e, b"r")?;
                let cell_type = attr_value(&e, b"t")?;
                let body = read_cell_body(reader)?;
                let Some(reference) = reference else {
                    continue;
                };
                let column = cell_column(&reference)?;
                if let Some(value) =
                    resolve_cell_value(cell_type.as_deref(), body, strings, &reference)?
                {
                    cells.insert(column, value);
                }
            }
            // A childless cell carries no value.
            Event::Empty(e) if e.local_name().as_ref() == b"c" => {}
            Event::End(e) if e.local_name().as_ref() == b"row" => break,
            Event::Eof => {
                return Err(WorkbookError::Invalid(
                    "unexpected eof inside worksheet row".to_string(),
                ));
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(cells)
}

struct CellBody {
    value: Option<String>,
    inline: Option<String>,
}

fn read_cell_body(reader: &mut Reader<&[u8]>) -> Result<CellBody, WorkbookError> {
    let mut buf = Vec::new();
    let mut body = CellBody {
        value: None,
        inline: None,
    };
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"v" => {
                body.value = Some(read_element_text(reader, &e)?);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"v" => {
                body.value = Some(String::new());
            }
            Event::Start(e) if e.local_name().as_ref() == b"is" => {
                body.inline = read_inline_text(reader, e.name())?;
            }
            Event::Start(e) if e.local_name().as_ref() == b"f" => {
                // Only cached values matter; formula text is skipped.
                reader.read_to_end_into(e.name(), &mut Vec::new())?;
            }
            Event::End(e) if e.local_name().as_ref() == b"c" => break,
            Event::Eof => {
                return Err(WorkbookError::Invalid(
                    "unexpected eof inside worksheet cell".to_string(),
                ));
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(body)
}

/// Text of the first direct `<t>` child of an inline `<is>` block.
/// Rich-text inline strings nest their `<t>` runs under `<r>` and decode
/// as blank; only shared strings fold runs together.
fn read_inline_text(
    reader: &mut Reader<&[u8]>,
    end: QName<'_>,
) -> Result<Option<String>, WorkbookError> {
    let mut buf = Vec::new();
    let mut text: Option<String> = None;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => {
                let run = read_element_text(reader, &e)?;
                if text.is_none() {
                    text = Some(run);
                }
            }
            Event::Empty(e) if e.local_name().as_ref() == b"t" => {
                if text.is_none() {
                    text = Some(String::new());
                }
            }
            Event::Start(e) => {
                reader.read_to_end_into(e.name(), &mut Vec::new())?;
            }
            Event::End(e) if e.name() == end => break,
            Event::Eof => {
                return Err(WorkbookError::Invalid(
                    "unexpected eof inside inline string".to_string(),
                ));
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}

fn read_element_text(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
) -> Result<String, WorkbookError> {
    let mut buf = Vec::new();
    let mut text = String::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(std::str::from_utf8(e.as_ref())?),
            Event::End(e) if e.name() == start.name() => break,
            Event::Eof => {
                return Err(WorkbookError::Invalid(
                    "unexpected eof inside cell value".to_string(),
                ));
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}

fn resolve_cell_value(
    cell_type: Option<&str>,
    body: CellBody,
    strings: &SharedStrings,
    reference: &str,
) -> Result<Option<String>, WorkbookError> {
    if cell_type == Some("inlineStr") {
        return Ok(body.inline);
    }
    let Some(raw) = body.value else {
        return Ok(None);
    };
    match cell_type {
        Some("s") => {
            let index: usize = raw.trim().parse().map_err(|_| {
                WorkbookError::Invalid(format!(
                    "malformed shared string index at {reference}: {raw}"
                ))
            })?;
            match strings.get(index) {
                Some(text) => Ok(Some(text.to_string())),
                None => {
                    log::warn!(
                        "cell {reference} references shared string {index} beyond table of {}",
                        strings.len()
                    );
                    Ok(None)
                }
            }
        }
        Some("b") => {
            let rendered = if raw.trim() == "1" { "TRUE" } else { "FALSE" };
            Ok(Some(rendered.to_string()))
        }
        _ => Ok(Some(raw)),
    }
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, WorkbookError> {
    for attr in e.attributes().with_checks(false) {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn row_number(e: &BytesStart<'_>) -> Result<Option<u32>, WorkbookError> {
    let Some(raw) = attr_value(e, b"r")? else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u32>()
        .map(Some)
        .map_err(|_| WorkbookError::Invalid(format!("malformed row reference: {raw}")))
}
