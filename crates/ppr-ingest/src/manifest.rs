//! Processed-artifact manifests.
//!
//! A processed workbook is a directory of CSV sheets plus a `workbook.json`
//! manifest recording sheet order, auto-filter ranges, and the write
//! timestamp. The manifest is written by the report side and read back here
//! when a new run needs the previous run's long-format history.

use std::path::Path;

use chrono::NaiveDate;
use ppr_frame::Table;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::extract::read_sheet_csv;

pub const MANIFEST_FILE: &str = "workbook.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetEntry {
    pub name: String,
    pub file: String,
    /// Auto-filter range annotation (e.g. `A1:G42`); absent for grids.
    pub auto_filter: Option<String>,
    /// Whether the first CSV row is a header row.
    pub header: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkbookManifest {
    /// Write timestamp, `%m%d%Y_%H%M%S`.
    pub written: String,
    pub sheets: Vec<SheetEntry>,
}

pub fn read_workbook_manifest(dir: &Path) -> Result<WorkbookManifest> {
    let path = dir.join(MANIFEST_FILE);
    let text = std::fs::read_to_string(&path).map_err(|source| IngestError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|error| IngestError::InvalidManifest {
        path,
        message: error.to_string(),
    })
}

/// Find and load the long-format history sheet of a processed artifact: the
/// sheet whose name parses as a date. Returns `None` when the artifact has
/// no such sheet (first ever run) or the artifact directory does not exist.
pub fn load_historical_long(dir: &Path) -> Result<Option<(NaiveDate, Table)>> {
    if !dir.join(MANIFEST_FILE).is_file() {
        return Ok(None);
    }
    let manifest = read_workbook_manifest(dir)?;
    for sheet in &manifest.sheets {
        let Ok(date) = NaiveDate::parse_from_str(&sheet.name, "%Y-%m-%d") else {
            continue;
        };
        let table = read_sheet_csv(&dir.join(&sheet.file))?;
        debug!(sheet = %sheet.name, rows = table.height(), "historical long data loaded");
        return Ok(Some((date, table)));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_manifest_means_no_history() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_historical_long(dir.path()).unwrap().is_none());
    }

    #[test]
    fn date_named_sheet_is_history() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = WorkbookManifest {
            written: "01312024_120000".to_string(),
            sheets: vec![
                SheetEntry {
                    name: "OriginalFormat".to_string(),
                    file: "01_OriginalFormat.csv".to_string(),
                    auto_filter: Some("A1:B2".to_string()),
                    header: true,
                },
                SheetEntry {
                    name: "2024-01-31".to_string(),
                    file: "04_long.csv".to_string(),
                    auto_filter: Some("A1:B2".to_string()),
                    header: true,
                },
            ],
        };
        fs::write(
            dir.path().join(MANIFEST_FILE),
            serde_json::to_string(&manifest).unwrap(),
        )
        .unwrap();
        fs::write(dir.path().join("04_long.csv"), "Year,Value\n2023,1\n").unwrap();
        let (date, table) = load_historical_long(dir.path()).unwrap().unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(table.height(), 1);
    }
}
