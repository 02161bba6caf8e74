//! The workbook sink: staged CSV sheets with auto-filter annotations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use ppr_frame::{Table, Value};
use ppr_ingest::{MANIFEST_FILE, SheetEntry, WorkbookManifest};
use tracing::{debug, info};

/// Accepts named tabular results and appends them as sheets to an output
/// artifact.
pub trait WorkbookSink {
    /// Append a tabular sheet; the sink records a full-range auto-filter
    /// annotation for it.
    fn append_table(&mut self, name: &str, table: &Table) -> Result<()>;

    /// Append a positioned cell grid (no header row, no auto-filter).
    fn append_grid(&mut self, name: &str, rows: &[Vec<Value>]) -> Result<()>;
}

/// Writes sheets into a staging directory, then commits the artifact by
/// renaming it into place. The previous artifact is only deleted after the
/// new one is fully persisted.
#[derive(Debug)]
pub struct CsvWorkbookSink {
    staging: PathBuf,
    final_path: PathBuf,
    written: NaiveDateTime,
    sheets: Vec<SheetEntry>,
}

impl CsvWorkbookSink {
    /// Create a sink staging into `<final_path>.staging`.
    pub fn create(final_path: impl Into<PathBuf>, written: NaiveDateTime) -> Result<Self> {
        let final_path = final_path.into();
        let staging = final_path.with_extension("staging");
        if staging.exists() {
            fs::remove_dir_all(&staging)
                .with_context(|| format!("clear stale staging dir {}", staging.display()))?;
        }
        fs::create_dir_all(&staging)
            .with_context(|| format!("create staging dir {}", staging.display()))?;
        Ok(Self {
            staging,
            final_path,
            written,
            sheets: Vec::new(),
        })
    }

    fn sheet_file(&self, name: &str) -> String {
        let safe: String = name
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                    ch
                } else {
                    '_'
                }
            })
            .collect();
        format!("{:02}_{safe}.csv", self.sheets.len() + 1)
    }

    /// Write the manifest, move the artifact into place, and delete the
    /// previous artifact only after the new one is fully persisted.
    pub fn commit(self, previous: Option<&Path>) -> Result<PathBuf> {
        let manifest = WorkbookManifest {
            written: self.written.format("%m%d%Y_%H%M%S").to_string(),
            sheets: self.sheets,
        };
        let manifest_path = self.staging.join(MANIFEST_FILE);
        let text = serde_json::to_string_pretty(&manifest).context("serialize manifest")?;
        fs::write(&manifest_path, text)
            .with_context(|| format!("write manifest {}", manifest_path.display()))?;

        if self.final_path.exists() {
            fs::remove_dir_all(&self.final_path).with_context(|| {
                format!("clear previous artifact at {}", self.final_path.display())
            })?;
        }
        fs::rename(&self.staging, &self.final_path).with_context(|| {
            format!("move staged artifact to {}", self.final_path.display())
        })?;

        if let Some(previous) = previous
            && previous != self.final_path
            && previous.exists()
        {
            fs::remove_dir_all(previous)
                .with_context(|| format!("remove old artifact {}", previous.display()))?;
            info!(path = %previous.display(), "previous artifact removed");
        }
        info!(path = %self.final_path.display(), "workbook committed");
        Ok(self.final_path)
    }
}

impl WorkbookSink for CsvWorkbookSink {
    fn append_table(&mut self, name: &str, table: &Table) -> Result<()> {
        let file = self.sheet_file(name);
        let path = self.staging.join(&file);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("create sheet {}", path.display()))?;
        writer
            .write_record(table.columns())
            .context("write sheet header")?;
        for row in table.rows() {
            let record: Vec<String> = row.iter().map(Value::text).collect();
            writer.write_record(&record).context("write sheet row")?;
        }
        writer.flush().context("flush sheet")?;

        let auto_filter = format!(
            "A1:{}{}",
            column_letter(table.width().max(1)),
            table.height() + 1
        );
        debug!(sheet = %name, rows = table.height(), filter = %auto_filter, "sheet written");
        self.sheets.push(SheetEntry {
            name: name.to_string(),
            file,
            auto_filter: Some(auto_filter),
            header: true,
        });
        Ok(())
    }

    fn append_grid(&mut self, name: &str, rows: &[Vec<Value>]) -> Result<()> {
        let file = self.sheet_file(name);
        let path = self.staging.join(&file);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("create sheet {}", path.display()))?;
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in rows {
            let mut record: Vec<String> = row.iter().map(Value::text).collect();
            record.resize(width, String::new());
            writer.write_record(&record).context("write grid row")?;
        }
        writer.flush().context("flush grid sheet")?;

        debug!(sheet = %name, rows = rows.len(), "grid sheet written");
        self.sheets.push(SheetEntry {
            name: name.to_string(),
            file,
            auto_filter: None,
            header: false,
        });
        Ok(())
    }
}

/// Spreadsheet column letter for a 1-based column number (`1` is `A`,
/// `27` is `AA`).
pub fn column_letter(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}
