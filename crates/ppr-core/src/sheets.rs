//! Per-screen normalization: crosswalk renames, screen-specific cleanup,
//! reconciliation, and the narrative/summary merge.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use ppr_frame::{JoinKind, Table, Value};
use ppr_model::columns::derived;
use ppr_model::{Crosswalk, DuplicateColumnFix, ExpectedSubmission, SchemaEpoch};
use tracing::warn;

use crate::crosswalk::resolve_renames;
use crate::reconcile::reconcile_missing;

/// Result of sheet processing: reconciled screens plus the identifier
/// columns available on all of them (including the derived `Missing` and
/// `CoalitionName` columns).
#[derive(Debug, Clone)]
pub struct ProcessedSheets {
    pub screens: BTreeMap<String, Table>,
    pub id_columns: Vec<String>,
}

/// Process every screen: rename columns through the crosswalk, clean the
/// summary-of-activities screen, reconcile against the expected submission
/// set, and finally merge the narrative screen into the summary screen on
/// the resolved identifier columns.
pub fn process_sheets(
    screens: &BTreeMap<String, Table>,
    crosswalk: &Crosswalk,
    expected: &[ExpectedSubmission],
    summary_screen: &str,
    narrative_screen: &str,
    id_columns: &[String],
    names: &Table,
    epoch: &SchemaEpoch,
) -> Result<ProcessedSheets> {
    let mut processed = BTreeMap::new();
    let mut shared_ids: Vec<String> = id_columns.to_vec();

    for (screen, table) in screens {
        let mut df = table.clone();

        let available: Vec<String> = id_columns
            .iter()
            .filter(|name| df.has_column(name))
            .cloned()
            .collect();
        shared_ids.retain(|name| available.contains(name));

        let renames: Vec<(String, String)> = resolve_renames(df.columns(), crosswalk)
            .into_iter()
            .collect();
        df = df.rename(&renames);

        if screen == summary_screen {
            df = clean_summary_screen(&df);
        }

        df = reconcile_missing(&df, expected, &available, names)
            .with_context(|| format!("reconcile {screen}"))?;
        processed.insert(screen.clone(), df);
    }

    shared_ids.push(derived::MISSING.to_string());
    shared_ids.push(derived::COALITION_NAME.to_string());

    // Merge the narrative questions for this epoch into the summary screen,
    // keeping summary rows even without a narrative match.
    let narrative = processed
        .get(narrative_screen)
        .with_context(|| format!("expected sheet not found: {narrative_screen}"))?;
    let prefixes = epoch.narrative_prefixes();
    let mut selected: Vec<&str> = shared_ids.iter().map(String::as_str).collect();
    for name in narrative.columns() {
        if prefixes.iter().any(|prefix| name.contains(prefix.as_str()))
            && !selected.contains(&name.as_str())
        {
            selected.push(name);
        }
    }
    let narrative_subset = narrative
        .select(&selected)
        .context("select narrative questions")?;

    let summary = processed
        .get(summary_screen)
        .with_context(|| format!("expected sheet not found: {summary_screen}"))?;
    let id_refs: Vec<&str> = shared_ids.iter().map(String::as_str).collect();
    let merged = summary
        .join(&narrative_subset, &id_refs, JoinKind::Left)
        .context("merge narrative questions into summary screen")?;
    processed.insert(summary_screen.to_string(), merged);

    Ok(ProcessedSheets {
        screens: processed,
        id_columns: shared_ids,
    })
}

/// Summary-of-activities cleanup: involvement placeholders become null and
/// trained counts coerce to numbers (non-numeric values null, non-fatal).
fn clean_summary_screen(table: &Table) -> Table {
    let mut df = table.clone();
    let involvement: Vec<String> = df
        .columns()
        .iter()
        .filter(|name| name.contains("Involvement"))
        .cloned()
        .collect();
    for column in involvement {
        df = df.map_column(&column, |value| match value.as_str() {
            Some(text) if text.eq_ignore_ascii_case("none") => Value::Null,
            Some(text) if text.eq_ignore_ascii_case("select") => Value::Null,
            _ => value.clone(),
        });
    }

    let trained: Vec<String> = df
        .columns()
        .iter()
        .filter(|name| name.contains("Trained"))
        .cloned()
        .collect();
    for column in trained {
        let mut coerced = 0usize;
        let values: Vec<Value> = df
            .column_values(&column)
            .unwrap_or_default()
            .into_iter()
            .map(|value| match value.as_f64() {
                Some(number) => Value::Num(number),
                None => {
                    if !value.is_null() {
                        coerced += 1;
                    }
                    Value::Null
                }
            })
            .collect();
        if coerced > 0 {
            warn!(column = %column, count = coerced, "non-numeric trained values nulled");
        }
        if let Ok(updated) = df.with_column(&column, values) {
            df = updated;
        }
    }
    df
}

/// Rename columns that duplicate a known substring. The first column
/// containing the substring is the correct one; later matches take the
/// configured replacement names in order. A count mismatch is warned, not
/// enforced: replacement proceeds with the shorter list.
pub fn fix_duplicate_columns(table: &Table, fixes: &[DuplicateColumnFix]) -> Table {
    let mut df = table.clone();
    for fix in fixes {
        let duplicates: Vec<String> = df
            .columns()
            .iter()
            .filter(|name| name.contains(&fix.substring) && name.as_str() != fix.substring)
            .cloned()
            .collect();
        if duplicates.is_empty() {
            continue;
        }
        if duplicates.len() != fix.replacements.len() {
            warn!(
                substring = %fix.substring,
                duplicates = duplicates.len(),
                replacements = fix.replacements.len(),
                "duplicate column count does not match replacements; renaming the shorter list"
            );
        }
        let renames: Vec<(String, String)> = duplicates
            .into_iter()
            .zip(fix.replacements.iter().cloned())
            .collect();
        df = df.rename(&renames);
    }
    df
}
