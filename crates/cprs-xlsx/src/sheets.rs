//! Worksheet listing and part resolution.
//!
//! `xl/workbook.xml` declares the sheets; `xl/_rels/workbook.xml.rels` maps
//! each sheet's `r:id` to the worksheet part that holds its cells.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use cprs_model::collapse_ws;
use cprs_opc::{rels_part_for, resolve_target, Package, RelationshipSet};

use crate::WorkbookError;

pub const WORKBOOK_PART: &str = "xl/workbook.xml";

/// A `<sheet>` entry from the workbook part, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRef {
    pub name: String,
    pub rel_id: Option<String>,
}

/// A sheet whose worksheet part path has been resolved through the rels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSheet {
    pub name: String,
    pub part: String,
}

pub fn list_sheets(package: &Package) -> Result<Vec<SheetRef>, WorkbookError> {
    let xml = package.read_part(WORKBOOK_PART)?;
    let text = std::str::from_utf8(xml)?;
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut sheets = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Empty(e) | Event::Start(e) => {
                if e.local_name().as_ref() == b"sheet" {
                    sheets.push(parse_sheet_element(&e)?);
                }
            }
            _ => {}
        }
        buf.clear();
    }
    if sheets.is_empty() {
        return Err(WorkbookError::NoSheets);
    }
    Ok(sheets)
}

/// The workbook's first sheet, resolved to its worksheet part.
pub fn first_sheet(package: &Package) -> Result<ResolvedSheet, WorkbookError> {
    let sheets = list_sheets(package)?;
    let rels = workbook_rels(package)?;
    let sheet = &sheets[0];
    resolve_sheet(&rels, sheet)
        .ok_or_else(|| WorkbookError::UnresolvedSheet(sheet.name.clone()))
}

/// First sheet whose normalized lowercase title contains one of `aliases`
/// and whose worksheet part resolves. Matching sheets without a resolvable
/// relationship are passed over.
pub fn sheet_matching(package: &Package, aliases: &[&str]) -> Result<ResolvedSheet, WorkbookError> {
    let sheets = list_sheets(package)?;
    let rels = workbook_rels(package)?;
    for sheet in &sheets {
        let title = collapse_ws(&sheet.name).to_lowercase();
        if aliases.iter().any(|alias| title.contains(alias)) {
            if let Some(resolved) = resolve_sheet(&rels, sheet) {
                log::debug!(
                    "worksheet '{}' resolved to {}",
                    resolved.name,
                    resolved.part
                );
                return Ok(resolved);
            }
        }
    }
    Err(WorkbookError::SheetNotFound(aliases.join(", ")))
}

fn workbook_rels(package: &Package) -> Result<RelationshipSet, WorkbookError> {
    match package.part(&rels_part_for(WORKBOOK_PART)) {
        Some(xml) => Ok(RelationshipSet::parse(xml)?),
        None => Ok(RelationshipSet::default()),
    }
}

fn resolve_sheet(rels: &RelationshipSet, sheet: &SheetRef) -> Option<ResolvedSheet> {
    let rel_id = sheet.rel_id.as_deref()?;
    let target = rels.internal_target(rel_id)?;
    Some(ResolvedSheet {
        name: sheet.name.clone(),
        part: resolve_target(WORKBOOK_PART, target),
    })
}

fn parse_sheet_element(e: &BytesStart<'_>) -> Result<SheetRef, WorkbookError> {
    let mut name = String::new();
    let mut rel_id: Option<String> = None;
    for attr in e.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        match key {
            b"name" => name = attr.unescape_value()?.to_string(),
            // Accept both the namespaced `r:id` and a bare `id`.
            _ if attr_local_name(key) == b"id" => {
                rel_id = Some(attr.unescape_value()?.to_string());
            }
            _ => {}
        }
    }
    Ok(SheetRef { name, rel_id })
}

fn attr_local_name(key: &[u8]) -> &[u8] {
    match key.iter().rposition(|&b| b == b':') {
        Some(pos) => &key[pos + 1..],
        None => key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;

    const WORKBOOK: &str = r#"<?xml version="1.0"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
          xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="Summary" sheetId="1" r:id="rId1"/>
    <sheet name=" CPRS - FCM " sheetId="2" r:id="rId2"/>
    <sheet name="Notes" sheetId="3" r:id="rId9"/>
  </sheets>
</workbook>"#;

    const WORKBOOK_RELS: &str = r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/>
</Relationships>"#;

    fn build_package(files: &[(&str, &str)]) -> Package {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut cursor);
            let options = FileOptions::<()>::default();
            for (name, contents) in files {
                zip.start_file(*name, options).unwrap();
                zip.write_all(contents.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        Package::from_bytes(&cursor.into_inner()).unwrap()
    }

    fn fixture() -> Package {
        build_package(&[
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/worksheets/sheet1.xml", "<worksheet/>"),
            ("xl/worksheets/sheet2.xml", "<worksheet/>"),
        ])
    }

    #[test]
    fn lists_sheets_in_declaration_order() {
        let sheets = list_sheets(&fixture()).unwrap();
        let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Summary", " CPRS - FCM ", "Notes"]);
        assert_eq!(sheets[0].rel_id.as_deref(), Some("rId1"));
    }

    #[test]
    fn first_sheet_resolves_through_rels() {
        let sheet = first_sheet(&fixture()).unwrap();
        assert_eq!(sheet.name, "Summary");
        assert_eq!(sheet.part, "xl/worksheets/sheet1.xml");
    }

    #[test]
    fn sheet_matching_normalizes_title() {
        let sheet = sheet_matching(&fixture(), &["cprs - fcm", "futures - fcm"]).unwrap();
        assert_eq!(sheet.name, " CPRS - FCM ");
        assert_eq!(sheet.part, "xl/worksheets/sheet2.xml");
    }

    #[test]
    fn sheet_matching_skips_unresolvable_entries() {
        // "Notes" points at rId9 which is absent from the rels.
        let err = sheet_matching(&fixture(), &["notes"]).unwrap_err();
        assert!(matches!(err, WorkbookError::SheetNotFound(_)));
    }

    #[test]
    fn empty_sheet_list_is_an_error() {
        let package = build_package(&[("xl/workbook.xml", "<workbook><sheets/></workbook>")]);
        let err = list_sheets(&package).unwrap_err();
        assert!(matches!(err, WorkbookError::NoSheets));
    }

    #[test]
    fn missing_workbook_part_is_an_error() {
        let package = build_package(&[("xl/styles.xml", "<styleSheet/>")]);
        let err = list_sheets(&package).unwrap_err();
        assert!(matches!(err, WorkbookError::Package(_)));
    }
}
