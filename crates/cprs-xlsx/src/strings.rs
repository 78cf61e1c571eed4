use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;

use cprs_opc::Package;

use crate::WorkbookError;

pub const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Shared string table (`xl/sharedStrings.xml`), indexed by `t="s"` cells.
///
/// Only the concatenated text content matters here; run formatting is
/// discarded. Every `<t>` inside an `<si>` contributes, so rich-text items
/// fold into one flat string.
#[derive(Debug, Clone, Default)]
pub struct SharedStrings {
    items: Vec<String>,
}

impl SharedStrings {
    /// Load the table from a package. Workbooks without the part get an
    /// empty table; numeric-only sheets ship none.
    pub fn load(package: &Package) -> Result<Self, WorkbookError> {
        match package.part(SHARED_STRINGS_PART) {
            Some(xml) => Self::parse(xml),
            None => Ok(Self::default()),
        }
    }

    pub fn parse(xml: &[u8]) -> Result<Self, WorkbookError> {
        let text = std::str::from_utf8(xml)?;
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut items = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) if e.local_name().as_ref() == b"si" => {
                    items.push(read_text_runs(&mut reader, e.name())?);
                }
                Event::Empty(e) if e.local_name().as_ref() == b"si" => {
                    items.push(String::new());
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(Self { items })
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Concatenated text of every `<t>` inside an `<si>` item, consuming events
/// up to the item's end tag.
fn read_text_runs(
    reader: &mut Reader<&[u8]>,
    end: QName<'_>,
) -> Result<String, WorkbookError> {
    let mut buf = Vec::new();
    let mut text = String::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => {
                text.push_str(&read_element_text(reader, e.name())?);
            }
            Event::End(e) if e.name() == end => break,
            Event::Eof => {
                return Err(WorkbookError::Invalid(
                    "unexpected eof inside string item".to_string(),
                ));
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}

fn read_element_text(reader: &mut Reader<&[u8]>, end: QName<'_>) -> Result<String, WorkbookError> {
    let mut buf = Vec::new();
    let mut text = String::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(std::str::from_utf8(e.as_ref())?),
            Event::End(e) if e.name() == end => break,
            Event::Eof => {
                return Err(WorkbookError::Invalid(
                    "unexpected eof inside shared string text".to_string(),
                ));
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}
