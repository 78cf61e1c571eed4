//! End-to-end FCM parses: sheet selection by alias, marker-bounded
//! sections, and the variant gates.

use cprs_opc::Package;
use cprs_xlsx::{
    parse_fcm_totals, parse_futures_detail, WorkbookError, FCM_TOTALS_COLUMNS,
    FUTURES_DETAIL_COLUMNS,
};
use pretty_assertions::assert_eq;
use rust_xlsxwriter::{Workbook, Worksheet};

// rust_xlsxwriter coordinates are 0-based; comments give 1-based sheet rows.

fn write_fcm_sheet(sheet: &mut Worksheet) {
    sheet.set_name("CPRS - FCM").unwrap();

    // Totals block: marker on sheet row 2, data from row 3.
    sheet.write_string(1, 2, "Total by Counterparty/ FCM").unwrap();
    sheet.write_string(2, 2, "Goldman Sachs").unwrap();
    sheet.write_number(2, 4, 10.0).unwrap();
    sheet.write_number(2, 5, 20.0).unwrap();
    sheet.write_number(2, 6, 0.0).unwrap();
    sheet.write_number(2, 7, 5.0).unwrap();
    sheet.write_number(2, 8, 0.0).unwrap();
    sheet.write_number(2, 10, 750.0).unwrap();
    sheet.write_number(2, 11, -12.5).unwrap();
    // All-zero placeholder line, sheet row 4.
    sheet.write_string(3, 2, "Morgan Stanley").unwrap();
    for col in [4u16, 5, 6, 7, 8, 10, 11] {
        sheet.write_number(3, col, 0.0).unwrap();
    }
    sheet.write_string(4, 2, "Total").unwrap();
    sheet.write_number(4, 10, 750.0).unwrap();

    // Futures detail block: marker row 7, header row 8, data from row 9.
    sheet.write_string(6, 2, "Futures Detail").unwrap();
    sheet.write_string(7, 2, "Account").unwrap();
    sheet.write_string(7, 4, "Description").unwrap();
    sheet.write_string(7, 6, "Class").unwrap();
    sheet.write_string(7, 7, "FCM").unwrap();
    sheet.write_string(7, 8, "Clearing House").unwrap();
    sheet.write_string(7, 11, "Notional").unwrap();

    sheet.write_string(8, 2, "12345").unwrap();
    sheet.write_string(8, 4, "S&P 500 E-mini").unwrap();
    sheet.write_string(8, 6, "Equity Index").unwrap();
    sheet.write_string(8, 7, "Goldman Sachs & Co.").unwrap();
    sheet.write_string(8, 8, "CME").unwrap();
    sheet.write_number(8, 11, 1_500_000.0).unwrap();

    // Page break repeats the header on sheet row 10.
    sheet.write_string(9, 2, "Account").unwrap();
    sheet.write_string(9, 4, "Description").unwrap();

    sheet.write_string(10, 2, "67890").unwrap();
    sheet.write_string(10, 4, "US 10yr Note").unwrap();
    sheet.write_string(10, 6, "Rates").unwrap();
    sheet.write_string(10, 7, "Morgan Stanley").unwrap();
    sheet.write_string(10, 8, "CBOT").unwrap();
    sheet.write_string(10, 11, "250,000").unwrap();

    // Footer bounds the section; anything after it is ignored.
    sheet
        .write_string(11, 2, "Risk exclusive of the Trend positions")
        .unwrap();
    sheet.write_string(12, 2, "99999").unwrap();
    sheet.write_number(12, 11, 1.0).unwrap();
}

fn fcm_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let decoy = workbook.add_worksheet();
    decoy.set_name("Summary").unwrap();
    decoy.write_string(0, 0, "cover page").unwrap();
    let sheet = workbook.add_worksheet();
    write_fcm_sheet(sheet);
    workbook.save_to_buffer().unwrap()
}

#[test]
fn totals_block_keeps_only_real_positions() {
    let package = Package::from_bytes(&fcm_workbook()).unwrap();
    let table = parse_fcm_totals(&package, "cprs_fcm_2024-03.xlsx").unwrap();

    let columns: Vec<&str> = table.columns().iter().map(String::as_str).collect();
    assert_eq!(columns, FCM_TOTALS_COLUMNS);
    // Goldman only: the all-zero line and the total line are dropped.
    assert_eq!(table.len(), 1);
    assert_eq!(
        table.value(0, "counterparty").unwrap().as_text(),
        Some("Goldman Sachs")
    );
    assert_eq!(table.value(0, "TIPS").unwrap().as_number(), Some(10.0));
    assert_eq!(table.value(0, "Notional").unwrap().as_number(), Some(750.0));
    assert_eq!(
        table.value(0, "NotionalChange").unwrap().as_number(),
        Some(-12.5)
    );
}

#[test]
fn futures_detail_skips_repeated_headers_and_stops_at_footer() {
    let package = Package::from_bytes(&fcm_workbook()).unwrap();
    let table = parse_futures_detail(&package, "cprs_fcm_2024-03.xlsx").unwrap();

    let columns: Vec<&str> = table.columns().iter().map(String::as_str).collect();
    assert_eq!(columns, FUTURES_DETAIL_COLUMNS);
    assert_eq!(table.len(), 2);

    assert_eq!(table.value(0, "account").unwrap().as_text(), Some("12345"));
    assert_eq!(
        table.value(0, "description").unwrap().as_text(),
        Some("S&P 500 E-mini")
    );
    assert_eq!(
        table.value(0, "clearing_house").unwrap().as_text(),
        Some("CME")
    );
    assert_eq!(
        table.value(0, "notional").unwrap().as_number(),
        Some(1_500_000.0)
    );

    // Second record came from text "250,000" and the row after the footer
    // never appears.
    assert_eq!(table.value(1, "account").unwrap().as_text(), Some("67890"));
    assert_eq!(table.value(1, "notional").unwrap().as_number(), Some(250_000.0));
}

#[test]
fn trend_variant_has_no_totals_block() {
    let package = Package::from_bytes(&fcm_workbook()).unwrap();
    let table = parse_fcm_totals(&package, "cprs_fcm_trend_2024-03.xlsx").unwrap();
    assert!(table.is_empty());
    let columns: Vec<&str> = table.columns().iter().map(String::as_str).collect();
    assert_eq!(columns, FCM_TOTALS_COLUMNS);

    // "Ex-Trend" contains "trend" but not "ex trend", so a hyphenated name
    // is a trend name: totals stay empty and the futures detail parses.
    let hyphenated = parse_fcm_totals(&package, "cprs_fcm_Ex-Trend_2024-03.xlsx").unwrap();
    assert!(hyphenated.is_empty());
    let futures = parse_futures_detail(&package, "cprs_fcm_Ex-Trend_2024-03.xlsx").unwrap();
    assert_eq!(futures.len(), 2);
}

#[test]
fn ex_trend_variant_has_no_futures_detail() {
    let package = Package::from_bytes(&fcm_workbook()).unwrap();
    let table = parse_futures_detail(&package, "cprs_fcm_ex trend_2024-03.xlsx").unwrap();
    assert!(table.is_empty());

    // The totals block still parses for ex-trend files.
    let totals = parse_fcm_totals(&package, "cprs_fcm_ex trend_2024-03.xlsx").unwrap();
    assert_eq!(totals.len(), 1);
}

#[test]
fn missing_fcm_sheet_is_an_error() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Portfolio Overview").unwrap();
    sheet.write_string(0, 0, "nothing here").unwrap();
    let package = Package::from_bytes(&workbook.save_to_buffer().unwrap()).unwrap();

    let err = parse_fcm_totals(&package, "cprs_fcm_2024-03.xlsx").unwrap_err();
    assert_eq!(
        err.to_string(),
        "no worksheet matches: cprs - fcm, futures - fcm, cprs-fcm"
    );
    assert!(matches!(err, WorkbookError::SheetNotFound(_)));
}

#[test]
fn workbook_without_sections_yields_empty_tables() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Futures - FCM").unwrap();
    sheet.write_string(0, 0, "no marker rows at all").unwrap();
    let package = Package::from_bytes(&workbook.save_to_buffer().unwrap()).unwrap();

    let totals = parse_fcm_totals(&package, "cprs_fcm_2024-03.xlsx").unwrap();
    assert!(totals.is_empty());
    let futures = parse_futures_detail(&package, "cprs_fcm_2024-03.xlsx").unwrap();
    assert!(futures.is_empty());
}
