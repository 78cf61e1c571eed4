//! Shared Open Packaging Conventions layer for `.xlsx` and `.pptx` files.
//!
//! An OPC package is a ZIP archive whose entries ("parts") are XML documents
//! plus embedded media, wired together by `_rels/*.rels` relationship parts.
//! This crate loads a package fully into memory with inflation limits,
//! resolves relationship targets to part names, and writes filtered copies
//! that preserve entry order and per-entry compression.
//!
//! Format-specific layers (`cprs-xlsx`, `cprs-pptx`) build on this crate.

mod package;
mod part_path;
mod rels;

pub use package::{Package, PackageError, PackageLimits, MAX_PART_BYTES, MAX_TOTAL_BYTES};
pub use part_path::{rels_part_for, resolve_target};
pub use rels::{Relationship, RelationshipSet};
