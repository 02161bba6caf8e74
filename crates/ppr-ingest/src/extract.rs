//! Raw OLDC extract loading.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ppr_frame::{Table, Value};
use tracing::{debug, info};

use crate::cell::{normalize_header, parse_cell};
use crate::error::{IngestError, Result};

/// One raw extract: every screen sheet, keyed by sheet name.
#[derive(Debug, Clone, Default)]
pub struct RawExtract {
    pub screens: BTreeMap<String, Table>,
}

impl RawExtract {
    pub fn screen(&self, name: &str) -> Result<&Table> {
        self.screens
            .get(name)
            .ok_or_else(|| IngestError::MissingSheet(name.to_string()))
    }
}

/// Supplies the fixed set of named screen tables for one run.
pub trait DataSource {
    fn load(&self) -> Result<RawExtract>;
}

/// Reads an extract from a directory of `Screen-N.csv` sheets.
#[derive(Debug, Clone)]
pub struct DirExtractSource {
    dir: PathBuf,
}

impl DirExtractSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DataSource for DirExtractSource {
    fn load(&self) -> Result<RawExtract> {
        let mut screens = BTreeMap::new();
        let entries = std::fs::read_dir(&self.dir).map_err(|source| IngestError::Io {
            path: self.dir.clone(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| IngestError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if !is_csv || !stem.starts_with("Screen-") {
                continue;
            }
            let table = read_sheet_csv(&path)?;
            debug!(sheet = %stem, rows = table.height(), "loaded screen");
            screens.insert(stem.to_string(), table);
        }
        if screens.is_empty() {
            return Err(IngestError::MissingSheet(format!(
                "no Screen-N.csv sheets under {}",
                self.dir.display()
            )));
        }
        info!(sheets = screens.len(), dir = %self.dir.display(), "raw extract loaded");
        Ok(RawExtract { screens })
    }
}

/// Read one CSV sheet into a typed table.
///
/// Duplicate headers are mangled with a `.N` suffix in order of appearance
/// (`X`, `X.1`, `X.2`, ...), matching how the upstream export tooling
/// disambiguated repeated grid headers.
pub fn read_sheet_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let headers = reader
        .headers()
        .map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let columns = mangle_duplicates(headers.iter().map(normalize_header));

    let mut table = Table::new(columns.clone())?;
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let mut row: Vec<Value> = record.iter().map(parse_cell).collect();
        row.resize(columns.len(), Value::Null);
        table.push_row(row)?;
    }
    Ok(table)
}

fn mangle_duplicates(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut columns = Vec::new();
    for name in names {
        let count = seen.entry(name.clone()).or_insert(0);
        if *count == 0 {
            columns.push(name.clone());
        } else {
            columns.push(format!("{name}.{count}"));
        }
        *count += 1;
    }
    columns
}
