//! Reading side of the pipeline: OLDC extract workbooks, the crosswalk
//! workbook, coalition name lookups, ground-truth overrides, and previously
//! processed artifacts.
//!
//! A "workbook" on disk is a directory of CSV sheets. Raw extracts name
//! their sheets `Screen-N.csv`; processed artifacts carry a
//! `workbook.json` manifest describing sheet order and auto-filter ranges.

pub mod cell;
pub mod crosswalk;
pub mod error;
pub mod extract;
pub mod manifest;
pub mod names;

pub use cell::parse_cell;
pub use crosswalk::{LookupTables, crosswalk_from_table, load_lookup_tables};
pub use error::{IngestError, Result};
pub use extract::{DataSource, DirExtractSource, RawExtract, read_sheet_csv};
pub use manifest::{
    MANIFEST_FILE, SheetEntry, WorkbookManifest, load_historical_long, read_workbook_manifest,
};
pub use names::{load_coalition_names, load_ground_truth};
