//! Crosswalk workbook loading.
//!
//! The crosswalk workbook carries four tabs: `lookup` (long-format element
//! lookup), `crosswalk` (field-name conversion), `cultspec_subawardee`
//! (subawardee category normalization), and `coalitions` (coalition field
//! labels). A missing tab file is fatal: the run cannot proceed without its
//! lookups.

use std::path::Path;

use ppr_frame::{Keep, Table, Value};
use ppr_model::columns::crosswalk as xw;
use ppr_model::{Crosswalk, CrosswalkEntry};
use tracing::info;

use crate::error::{IngestError, Result};
use crate::extract::read_sheet_csv;

/// The loaded crosswalk workbook.
#[derive(Debug, Clone)]
pub struct LookupTables {
    /// `lookup` tab: element metadata for long-format grantee data.
    pub lookup: Table,
    /// `crosswalk` tab: raw field identifier to label conversion.
    pub field_names: Table,
    /// `cultspec_subawardee` tab, deduplicated on the category column.
    pub subawardee: Table,
    /// `coalitions` tab as a resolver-ready crosswalk.
    pub coalitions: Crosswalk,
}

pub fn load_lookup_tables(dir: &Path) -> Result<LookupTables> {
    let lookup = load_tab(dir, "lookup")?;
    let lookup = upper_case_columns(&lookup, &[xw::ELEMENT, xw::META_NAME_DESCRIPTION]);

    let field_names = load_tab(dir, "crosswalk")?;
    let field_names = upper_case_columns(&field_names, &[xw::ELEMENT, xw::META_NAME_DESCRIPTION]);
    // Rows with neither a raw name nor a note are separators in the
    // workbook; drop them.
    let field_names = field_names.filter(|row| {
        !(row.get(xw::META_NAME_DESCRIPTION).is_null() && row.get(xw::NOTE).is_null())
    });

    let subawardee = load_tab(dir, "cultspec_subawardee")?
        .dedupe_by(&[xw::SUBAWARDEE_CATEGORY], Keep::First)?;

    let coalitions = crosswalk_from_table(&load_tab(dir, "coalitions")?)?;

    info!(dir = %dir.display(), "crosswalk workbook loaded");
    Ok(LookupTables {
        lookup,
        field_names,
        subawardee,
        coalitions,
    })
}

fn load_tab(dir: &Path, name: &str) -> Result<Table> {
    let path = dir.join(format!("{name}.csv"));
    if !path.is_file() {
        return Err(IngestError::MissingSheet(format!(
            "crosswalk tab {name} ({})",
            path.display()
        )));
    }
    read_sheet_csv(&path)
}

/// Build a resolver-ready crosswalk from a tab with raw-name, label, and
/// (optionally) group columns.
pub fn crosswalk_from_table(table: &Table) -> Result<Crosswalk> {
    if !table.has_column(xw::META_NAME_DESCRIPTION) {
        return Err(IngestError::MissingColumn {
            sheet: "crosswalk".to_string(),
            column: xw::META_NAME_DESCRIPTION.to_string(),
        });
    }
    if !table.has_column(xw::LABEL) {
        return Err(IngestError::MissingColumn {
            sheet: "crosswalk".to_string(),
            column: xw::LABEL.to_string(),
        });
    }
    let entries = table
        .iter_rows()
        .filter_map(|row| {
            let raw_name = non_empty(row.get(xw::META_NAME_DESCRIPTION))?;
            let label = non_empty(row.get(xw::LABEL))?;
            let group = non_empty(row.get(xw::GROUP_DESCRIPTION)).unwrap_or_default();
            Some(CrosswalkEntry {
                raw_name,
                label,
                group,
            })
        })
        .collect();
    Ok(Crosswalk::new(entries))
}

fn non_empty(value: &Value) -> Option<String> {
    let text = value.text();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn upper_case_columns(table: &Table, columns: &[&str]) -> Table {
    let mut result = table.clone();
    for column in columns {
        result = result.map_column(column, |value| match value.as_str() {
            Some(text) => Value::Str(text.to_uppercase()),
            None => value.clone(),
        });
    }
    result
}
