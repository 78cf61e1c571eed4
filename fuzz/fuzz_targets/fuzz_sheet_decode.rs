#![no_main]

use libfuzzer_sys::fuzz_target;

use cprs_xlsx::{
    build_header_map, find_header_row, scan_segments, segment_ranges, Grid, SharedStrings,
};

/// Bound the XML fed into the decoder; worksheet parts the extractor sees are
/// far smaller, and huge inputs just slow the fuzzer down.
const MAX_INPUT_BYTES: usize = 1 << 20;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let data = if data.len() > MAX_INPUT_BYTES {
        &data[..MAX_INPUT_BYTES]
    } else {
        data
    };

    // First byte splits the input into a shared-strings part and a sheet
    // part so string-table indices get exercised against varying tables.
    let split = usize::from(data[0]) % data.len();
    let (strings_xml, sheet_xml) = data.split_at(split);

    let strings = SharedStrings::parse(strings_xml).unwrap_or_default();
    let Ok(grid) = Grid::decode(sheet_xml, &strings) else {
        return;
    };

    // Row iteration must agree with max_row on anything that decoded.
    let mut last = 0;
    for row in grid.row_numbers() {
        assert!(row >= last);
        last = row;
    }
    assert!(grid.is_empty() || last == grid.max_row());

    // The downstream scanners must hold their shape invariants on arbitrary
    // decoded grids.
    if let Some(header_row) = find_header_row(&grid) {
        if let Ok(map) = build_header_map(&grid, header_row) {
            let mut seen = std::collections::BTreeSet::new();
            for (field, column) in map.iter() {
                // The counterparty fallback may share a column that an alias
                // already claimed; every other binding is unique.
                if field != "Counterparty" {
                    assert!(seen.insert(column), "two fields bound the same column");
                }
            }
        }
    }
    let markers = scan_segments(&grid);
    let ranges = segment_ranges(&markers, grid.max_row());
    for pair in ranges.windows(2) {
        assert!(pair[0].end_row < pair[1].start_row);
    }
});
