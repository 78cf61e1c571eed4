//! Canonical entity-name maps.
//!
//! Vendor workbooks spell the same institutions several ways across months;
//! the rollup layer joins on the canonical historical label. Lookups are
//! exact after whitespace collapsing; unknown names pass through unchanged
//! (collapsed) so new entities surface in output rather than vanish.

use crate::text::collapse_ws;

const COUNTERPARTY_CANON: &[(&str, &str)] = &[
    ("Citigroup", "Citibank"),
    ("Bank of America, NA", "Bank of America"),
    ("Bank of America NA", "Bank of America"),
    ("Goldman Sachs Int'l", "Goldman Sachs"),
    ("Societe Generale", "Soc Gen"),
    ("Barclays Bank PLC", "Barclays"),
];

const CLEARING_HOUSE_CANON: &[(&str, &str)] = &[
    ("CME Clearing House", "CME"),
    ("ICE Clear U.S.", "ICE"),
    ("ICE Clear US", "ICE"),
    ("ICE Clear Europe", "ICE Euro"),
    ("EUREX Clearing", "EUREX"),
    ("Japan Securities Clearing Corporation", "Japan SCC"),
    ("Korea Exchange (in-house)", "Korea Exchange"),
];

fn canonicalize(name: &str, table: &[(&str, &str)]) -> String {
    let collapsed = collapse_ws(name);
    table
        .iter()
        .find(|(vendor, _)| *vendor == collapsed)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(collapsed)
}

/// Canonical counterparty label for a vendor spelling.
pub fn canonical_counterparty(name: &str) -> String {
    canonicalize(name, COUNTERPARTY_CANON)
}

/// Canonical clearing-house label for a vendor spelling.
pub fn canonical_clearing_house(name: &str) -> String {
    canonicalize(name, CLEARING_HOUSE_CANON)
}
