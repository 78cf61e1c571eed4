//! `cprs-model` defines the output-side data structures shared by the CPRS
//! extraction crates.
//!
//! The crate is intentionally free of any container/XML concerns so it can be
//! reused by:
//! - the workbook parsers (`cprs-xlsx`), which emit [`Table`] values
//! - the downstream rollup/reporting layer, which consumes them (JSON-safe via
//!   `serde`)
//!
//! It also hosts the numeric normalizer ([`to_number`]) and the canonical
//! entity-name maps, both of which are pure text-domain concerns.

mod names;
mod numbers;
mod table;
mod text;

pub use names::{canonical_clearing_house, canonical_counterparty};
pub use numbers::{check_magnitude, to_number, NumberError, MAX_ABS_VALUE};
pub use table::{Table, TableError, Value};
pub use text::collapse_ws;
