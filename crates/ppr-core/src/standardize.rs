//! Submission standardization: one canonical row per entity, year, and
//! program on every screen.

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use ppr_frame::{JoinKind, Table, Value};
use ppr_model::SchemaEpoch;
use ppr_model::columns::{raw, renamed};
use tracing::{debug, info};

/// Result of standardization: the narrowed screens plus the identifier
/// columns actually shared across them.
#[derive(Debug, Clone)]
pub struct StandardizedScreens {
    pub screens: BTreeMap<String, Table>,
    pub id_columns: Vec<String>,
}

/// Identifier columns for a run, resolved from the first screen's shared
/// column prefix: the raw prefix minus the columns that standardization
/// renames or drops, plus the renamed identifiers the epoch introduces.
pub fn resolve_identifier_columns(screen1: &Table, epoch: &SchemaEpoch) -> Vec<String> {
    let prefix_end = screen1.width().min(41);
    let excluded: Vec<&str> = epoch
        .transient_columns
        .iter()
        .map(String::as_str)
        .chain(epoch.identifier_renames.iter().map(|(from, _)| from.as_str()))
        .chain([raw::REV_SEQ_NUMBER, raw::SUBMIT_DATE, raw::EIN])
        .collect();
    let mut id_columns: Vec<String> = screen1.columns()[1..prefix_end]
        .iter()
        .filter(|name| !excluded.contains(&name.as_str()))
        .cloned()
        .collect();
    for (_, to) in &epoch.identifier_renames {
        if !id_columns.contains(to) {
            id_columns.push(to.clone());
        }
    }
    id_columns
}

/// Standardize each screen down to one row per submission key.
///
/// Per screen, in order: keep only the rows carrying the group-maximum
/// revision sequence number, then the group-maximum submission date, then
/// the group-minimum row iteration (the guaranteed-unique tie-break). Each
/// rule narrows the survivors of the previous one. The entity display name
/// is joined on afterwards, and every screen past the first is joined back
/// onto Screen-1 so all screens share one identifier set.
pub fn standardize_screens(
    screens: &BTreeMap<String, Table>,
    id_columns: &[String],
    names: &Table,
    epoch: &SchemaEpoch,
) -> Result<StandardizedScreens> {
    let mut processed: BTreeMap<String, Table> = BTreeMap::new();
    let mut screen1: Option<Table> = None;
    let mut screen1_shared: Vec<String> = Vec::new();

    for (screen, table) in screens {
        let mut df = table.clone();
        // The per-sheet EIN column is stale; the canonical EIN comes from
        // the renamed RptEin.
        if df.has_column(raw::EIN) && df.has_column(raw::RPT_EIN) {
            df = df.drop_columns(&[raw::EIN]);
        }
        df = df.rename(&epoch.identifier_renames);

        let ids: Vec<&str> = id_columns
            .iter()
            .map(String::as_str)
            .filter(|name| df.has_column(name))
            .collect();
        if ids.is_empty() {
            bail!("screen {screen} shares no identifier columns");
        }

        if df.has_column(raw::REV_SEQ_NUMBER) {
            df = df
                .retain_group_max(&ids, raw::REV_SEQ_NUMBER)
                .with_context(|| format!("narrow {screen} by revision number"))?;
        }
        if df.has_column(raw::SUBMIT_DATE) {
            df = parse_submit_dates(&df, screen)?;
            df = df
                .retain_group_max(&ids, raw::SUBMIT_DATE)
                .with_context(|| format!("narrow {screen} by submission date"))?;
        }
        if !df.has_column(raw::ROW_ITERATION) {
            bail!("screen {screen} is missing the {} column", raw::ROW_ITERATION);
        }
        df = df
            .retain_group_min(&ids, raw::ROW_ITERATION)
            .with_context(|| format!("narrow {screen} by row iteration"))?;

        df = df
            .join(names, &[renamed::STATE], JoinKind::Left)
            .with_context(|| format!("attach display names to {screen}"))?;
        let name_columns: Vec<String> = df
            .columns()
            .iter()
            .filter(|name| {
                name.replace(' ', "").to_lowercase().contains("granteename")
            })
            .cloned()
            .collect();
        let name_refs: Vec<&str> = name_columns.iter().map(String::as_str).collect();
        df = df.drop_columns(&name_refs);

        match &screen1 {
            None => {
                screen1 = Some(df.clone());
            }
            Some(first) => {
                let shared: Vec<&str> = first
                    .columns()
                    .iter()
                    .map(String::as_str)
                    .filter(|name| {
                        df.has_column(name)
                            && !epoch.transient_columns.iter().any(|t| t == *name)
                    })
                    .collect();
                df = df
                    .join(first, &shared, JoinKind::Left)
                    .with_context(|| format!("propagate Screen-1 identifiers to {screen}"))?;
                screen1_shared = shared.iter().map(|name| (*name).to_string()).collect();
            }
        }
        debug!(sheet = %screen, rows = df.height(), "screen standardized");
        processed.insert(screen.clone(), df);
    }

    let first = screen1.context("extract has no screens")?;
    let mut resolved: Vec<String> = id_columns.to_vec();
    for name in first.columns() {
        let transient = epoch.transient_columns.iter().any(|t| t == name);
        if !transient && !screen1_shared.contains(name) && !resolved.contains(name) {
            resolved.push(name.clone());
        }
    }
    resolved.retain(|name| !epoch.transient_columns.contains(name));
    info!(screens = processed.len(), ids = resolved.len(), "submissions standardized");

    Ok(StandardizedScreens {
        screens: processed,
        id_columns: resolved,
    })
}

/// Parse a screen's submission dates strictly. Unparsable values are fatal;
/// absent dates stay null and never win a group maximum.
pub(crate) fn parse_submit_dates(table: &Table, screen: &str) -> Result<Table> {
    let values = table.column_values(raw::SUBMIT_DATE)?;
    let mut parsed = Vec::with_capacity(values.len());
    for value in values {
        let date = match &value {
            Value::Null => Value::Null,
            Value::Date(_) => value.clone(),
            other => {
                let text = other.text();
                match NaiveDate::parse_from_str(text.trim(), "%m/%d/%Y") {
                    Ok(date) => Value::Date(date),
                    Err(_) => bail!(
                        "unparsable submission date {text:?} on screen {screen}"
                    ),
                }
            }
        };
        parsed.push(date);
    }
    Ok(table.with_column(raw::SUBMIT_DATE, parsed)?)
}
