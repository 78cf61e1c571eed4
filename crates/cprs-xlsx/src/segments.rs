//! Segment markers: the labeled rows that split a clearing-house sheet into
//! per-program blocks.

use std::collections::BTreeSet;

use cprs_model::collapse_ws;

use crate::grid::Grid;
use crate::WorkbookError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SegmentKind {
    Swaps,
    Repo,
    Futures,
    FuturesCdx,
}

impl SegmentKind {
    /// Identifier emitted in the `Segment` output column.
    pub fn label(self) -> &'static str {
        match self {
            SegmentKind::Swaps => "swaps",
            SegmentKind::Repo => "repo",
            SegmentKind::Futures => "futures",
            SegmentKind::FuturesCdx => "futures_cdx",
        }
    }
}

/// Marker spellings, matched exactly against the normalized lowercase text
/// of column 1. The futures/CDX spellings come before the plain kinds.
pub const SEGMENT_PATTERNS: &[(&str, SegmentKind)] = &[
    ("futures cdx", SegmentKind::FuturesCdx),
    ("futures/cdx", SegmentKind::FuturesCdx),
    ("futures / cdx", SegmentKind::FuturesCdx),
    ("futures-cdx", SegmentKind::FuturesCdx),
    ("swaps", SegmentKind::Swaps),
    ("repo", SegmentKind::Repo),
    ("futures", SegmentKind::Futures),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentMarker {
    pub kind: SegmentKind,
    pub row: u32,
}

/// Program mix a workbook covers, inferred from its naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    AllPrograms,
    Trend,
    ExTrend,
}

impl Variant {
    /// Inference runs over the raw lowercased file name + sheet title; `ex
    /// trend` outranks the bare `trend` substring it contains. Vendor files
    /// spell the variant with a single space, so no other spelling counts.
    pub fn infer(source_name: &str, sheet_title: &str) -> Self {
        let haystack = format!("{source_name} {sheet_title}").to_lowercase();
        if haystack.contains("ex trend") {
            Variant::ExTrend
        } else if haystack.contains("trend") {
            Variant::Trend
        } else {
            Variant::AllPrograms
        }
    }

    pub fn expected_segments(self) -> &'static [SegmentKind] {
        match self {
            Variant::AllPrograms => &[
                SegmentKind::Swaps,
                SegmentKind::Repo,
                SegmentKind::FuturesCdx,
            ],
            Variant::Trend => &[SegmentKind::Futures],
            Variant::ExTrend => &[SegmentKind::Swaps, SegmentKind::Repo],
        }
    }
}

/// Scan column 1 of every populated row for segment markers. Rows are
/// visited in ascending order, so the result is already row-ordered.
pub fn scan_segments(grid: &Grid) -> Vec<SegmentMarker> {
    let mut markers = Vec::new();
    for row in grid.row_numbers() {
        let Some(text) = grid.cell(row, 1) else {
            continue;
        };
        let label = collapse_ws(text).to_lowercase();
        if label.is_empty() {
            continue;
        }
        let Some(kind) = SEGMENT_PATTERNS
            .iter()
            .find(|(pattern, _)| *pattern == label)
            .map(|(_, kind)| *kind)
        else {
            continue;
        };
        markers.push(SegmentMarker { kind, row });
    }
    if !markers.is_empty() {
        log::debug!("{} segment marker(s) found", markers.len());
    }
    markers
}

/// Check found markers against the variant's expected set.
///
/// Vendor quirk, reproduced as-is: a trend workbook whose only marker is
/// labeled `swaps` actually holds the futures block. The marker list then
/// collapses to that first marker, relabeled. After relabeling, any expected
/// segment still missing is an error; extra segments are tolerated.
pub fn validate_segments(
    markers: Vec<SegmentMarker>,
    variant: Variant,
) -> Result<Vec<SegmentMarker>, WorkbookError> {
    let expected: BTreeSet<SegmentKind> = variant.expected_segments().iter().copied().collect();
    let found: BTreeSet<SegmentKind> = markers.iter().map(|marker| marker.kind).collect();

    let mut markers = markers;
    if expected.len() == 1
        && expected.contains(&SegmentKind::Futures)
        && found.len() == 1
        && found.contains(&SegmentKind::Swaps)
    {
        if let Some(first) = markers.first().copied() {
            log::warn!(
                "trend workbook labels its futures block 'swaps' at row {}; relabeling",
                first.row
            );
            markers = vec![SegmentMarker {
                kind: SegmentKind::Futures,
                row: first.row,
            }];
        }
    }

    let found: BTreeSet<SegmentKind> = markers.iter().map(|marker| marker.kind).collect();
    let mut missing: Vec<String> = expected
        .difference(&found)
        .map(|kind| kind.label().to_string())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(WorkbookError::MissingSegments { missing });
    }
    Ok(markers)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentRange {
    pub kind: SegmentKind,
    pub start_row: u32,
    pub end_row: u32,
}

/// Each segment runs from its marker row to the row before the next marker;
/// the final segment runs to the sheet's last used row.
pub fn segment_ranges(markers: &[SegmentMarker], max_row: u32) -> Vec<SegmentRange> {
    let mut ranges = Vec::with_capacity(markers.len());
    for (i, marker) in markers.iter().enumerate() {
        let end_row = match markers.get(i + 1) {
            Some(next) => next.row.saturating_sub(1),
            None => max_row,
        };
        ranges.push(SegmentRange {
            kind: marker.kind,
            start_row: marker.row,
            end_row,
        });
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colref::column_letters;
    use crate::strings::SharedStrings;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn grid_from(cells: &[(u32, u32, &str)]) -> Grid {
        let mut rows: BTreeMap<u32, Vec<(u32, &str)>> = BTreeMap::new();
        for &(row, col, text) in cells {
            rows.entry(row).or_default().push((col, text));
        }
        let mut xml = String::from("<worksheet><sheetData>");
        for (row, cols) in &rows {
            xml.push_str(&format!("<row r=\"{row}\">"));
            for (col, text) in cols {
                let reference = format!("{}{row}", column_letters(*col).unwrap());
                xml.push_str(&format!(
                    "<c r=\"{reference}\" t=\"inlineStr\"><is><t>{text}</t></is></c>"
                ));
            }
            xml.push_str("</row>");
        }
        xml.push_str("</sheetData></worksheet>");
        Grid::decode(xml.as_bytes(), &SharedStrings::default()).unwrap()
    }

    #[test]
    fn scans_markers_in_row_order() {
        let grid = grid_from(&[
            (5, 1, "Swaps"),
            (6, 2, "CME Clearing"),
            (12, 1, "Repo"),
            (20, 1, "Futures / CDX"),
        ]);
        let markers = scan_segments(&grid);
        assert_eq!(
            markers,
            vec![
                SegmentMarker {
                    kind: SegmentKind::Swaps,
                    row: 5
                },
                SegmentMarker {
                    kind: SegmentKind::Repo,
                    row: 12
                },
                SegmentMarker {
                    kind: SegmentKind::FuturesCdx,
                    row: 20
                },
            ]
        );
    }

    #[test]
    fn marker_match_is_exact_and_in_column_one_only() {
        let grid = grid_from(&[
            (3, 1, "Swaps Desk"),
            (4, 2, "Repo"),
            (5, 1, "  swaps  "),
        ]);
        let markers = scan_segments(&grid);
        assert_eq!(
            markers,
            vec![SegmentMarker {
                kind: SegmentKind::Swaps,
                row: 5
            }]
        );
    }

    #[test]
    fn recognizes_futures_cdx_spellings() {
        for spelling in ["Futures CDX", "Futures/CDX", "Futures / CDX", "futures-cdx"] {
            let grid = grid_from(&[(2, 1, spelling)]);
            let markers = scan_segments(&grid);
            assert_eq!(markers.len(), 1, "{spelling}");
            assert_eq!(markers[0].kind, SegmentKind::FuturesCdx, "{spelling}");
        }
    }

    #[test]
    fn infers_variant_from_naming() {
        assert_eq!(
            Variant::infer("cprs_ch_2024-03.xlsx", "CPRS - CH"),
            Variant::AllPrograms
        );
        assert_eq!(
            Variant::infer("cprs_ch_trend.xlsx", "CPRS - CH"),
            Variant::Trend
        );
        assert_eq!(
            Variant::infer("cprs_ch.xlsx", "CPRS - CH Ex Trend"),
            Variant::ExTrend
        );
        assert_eq!(
            Variant::infer("cprs ch ex trend.xlsx", ""),
            Variant::ExTrend
        );
    }

    #[test]
    fn ex_trend_requires_the_vendor_spelling() {
        // "ex-trend" and "ex  trend" contain "trend" but not "ex trend".
        assert_eq!(
            Variant::infer("cprs_fcm_ex-trend_2024-03.xlsx", "CPRS - FCM"),
            Variant::Trend
        );
        assert_eq!(
            Variant::infer("cprs ch ex  trend.xlsx", ""),
            Variant::Trend
        );
        assert_eq!(
            Variant::infer("cprs_ch.xlsx", "CPRS - CH Ex-Trend"),
            Variant::Trend
        );
    }

    #[test]
    fn validates_complete_all_programs_set() {
        let markers = vec![
            SegmentMarker {
                kind: SegmentKind::Swaps,
                row: 5,
            },
            SegmentMarker {
                kind: SegmentKind::Repo,
                row: 12,
            },
            SegmentMarker {
                kind: SegmentKind::FuturesCdx,
                row: 20,
            },
        ];
        let validated = validate_segments(markers.clone(), Variant::AllPrograms).unwrap();
        assert_eq!(validated, markers);
    }

    #[test]
    fn extra_segments_are_tolerated() {
        let markers = vec![
            SegmentMarker {
                kind: SegmentKind::Swaps,
                row: 5,
            },
            SegmentMarker {
                kind: SegmentKind::Repo,
                row: 12,
            },
        ];
        let validated = validate_segments(markers.clone(), Variant::ExTrend).unwrap();
        assert_eq!(validated.len(), 2);

        let with_extra = vec![
            markers[0],
            markers[1],
            SegmentMarker {
                kind: SegmentKind::Futures,
                row: 30,
            },
        ];
        let validated = validate_segments(with_extra.clone(), Variant::ExTrend).unwrap();
        assert_eq!(validated, with_extra);
    }

    #[test]
    fn relabels_lone_swaps_marker_for_trend_workbooks() {
        let markers = vec![SegmentMarker {
            kind: SegmentKind::Swaps,
            row: 7,
        }];
        let validated = validate_segments(markers, Variant::Trend).unwrap();
        assert_eq!(
            validated,
            vec![SegmentMarker {
                kind: SegmentKind::Futures,
                row: 7
            }]
        );
    }

    #[test]
    fn relabel_does_not_apply_outside_trend() {
        let markers = vec![SegmentMarker {
            kind: SegmentKind::Swaps,
            row: 7,
        }];
        let err = validate_segments(markers, Variant::AllPrograms).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing expected segments: futures_cdx, repo"
        );
    }

    #[test]
    fn missing_segments_are_sorted_in_the_error() {
        let err = validate_segments(Vec::new(), Variant::AllPrograms).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing expected segments: futures_cdx, repo, swaps"
        );
    }

    #[test]
    fn ranges_tile_the_sheet_without_gaps() {
        let markers = vec![
            SegmentMarker {
                kind: SegmentKind::Swaps,
                row: 10,
            },
            SegmentMarker {
                kind: SegmentKind::Repo,
                row: 25,
            },
            SegmentMarker {
                kind: SegmentKind::FuturesCdx,
                row: 31,
            },
        ];
        let ranges = segment_ranges(&markers, 40);
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0].start_row, 10);
        assert_eq!(ranges[2].end_row, 40);
        for pair in ranges.windows(2) {
            assert!(pair[0].start_row <= pair[0].end_row);
            assert_eq!(pair[0].end_row + 1, pair[1].start_row);
        }
    }

    #[test]
    fn single_marker_extends_to_last_used_row() {
        let markers = vec![SegmentMarker {
            kind: SegmentKind::Futures,
            row: 4,
        }];
        let ranges = segment_ranges(&markers, 9);
        assert_eq!(
            ranges,
            vec![SegmentRange {
                kind: SegmentKind::Futures,
                start_row: 4,
                end_row: 9
            }]
        );
    }
}
