//! Long-format transforms: grantee entity-attribute-value data and the two
//! coalition long views.

use anyhow::{Context, Result};
use ppr_frame::{JoinKind, Keep, Table, Value};
use ppr_model::columns::{crosswalk as xw, long, raw};
use ppr_model::{Crosswalk, SchemaEpoch};
use tracing::{debug, warn};

use crate::crosswalk::resolve_renames;

const MELT_IDS: [&str; 5] = [
    raw::GRANTEE_TYPE,
    raw::FISCAL_YEAR,
    raw::PROG_ACRONYM,
    raw::POSTAL_CODE,
    long::EIN,
];

/// Melt both grantee populations (states carry the engineered funding
/// totals, tribes do not) into one long table over the five identifier
/// columns.
pub fn melt_population_long(states: &Table, tribes: &Table) -> Result<Table> {
    let states_long = states
        .melt_all(&MELT_IDS, long::VARIABLE, "value")
        .context("melt state data")?;
    let tribes_long = tribes
        .melt_all(&MELT_IDS, long::VARIABLE, "value")
        .context("melt tribe data")?;
    Ok(states_long.vstack(&tribes_long))
}

/// Join melted grantee data onto the lookup tab.
///
/// Attributes resolve against `Meta Name Description`; attributes the
/// lookup does not know are dropped (silently, per the source system),
/// except the two engineered subawardee funding totals, which bypass the
/// filter and carry their own names as elements.
pub fn join_long_to_lookup(
    melted: &Table,
    lookup: &Table,
    epoch: &SchemaEpoch,
) -> Result<Table> {
    let mut df = melted.map_column(long::VARIABLE, |value| match value.as_str() {
        Some(text) => {
            for (from, to) in &epoch.long_variable_fixes {
                if text == from {
                    return Value::from(to.as_str());
                }
            }
            Value::Str(text.to_uppercase())
        }
        None => value.clone(),
    });
    // Fixes may substitute already-upper-cased targets; normalize again.
    df = df.map_column(long::VARIABLE, |value| match value.as_str() {
        Some(text) => Value::Str(text.to_uppercase()),
        None => value.clone(),
    });

    df = df
        .join_on(
            lookup,
            &[long::VARIABLE],
            &[xw::META_NAME_DESCRIPTION],
            JoinKind::Left,
        )
        .context("join lookup tab")?
        .drop_columns(&[xw::META_NAME_DESCRIPTION]);
    if !df.has_column(xw::ELEMENT) {
        anyhow::bail!("lookup tab is missing the {} column", xw::ELEMENT);
    }

    let synthetic = [
        ppr_model::columns::derived::SUBAWARDEE_SHELTER_TOTAL,
        ppr_model::columns::derived::SUBAWARDEE_NONSHELTER_TOTAL,
    ];
    let variable_values = df.column_values(long::VARIABLE)?;
    let mut elements = df.column_values(xw::ELEMENT)?;
    for (element, variable) in elements.iter_mut().zip(&variable_values) {
        if let Some(name) = variable.as_str()
            && synthetic.contains(&name)
        {
            *element = variable.clone();
        }
    }
    df = df.with_column(xw::ELEMENT, elements)?;

    let kept = df.filter(|row| !row.get(xw::ELEMENT).is_null());
    let dropped = df.height().saturating_sub(kept.height());
    if dropped > 0 {
        debug!(dropped, "attributes without a lookup match dropped");
    }

    let selected = kept
        .select(&[
            raw::GRANTEE_TYPE,
            raw::FISCAL_YEAR,
            raw::PROG_ACRONYM,
            raw::POSTAL_CODE,
            long::EIN,
            "Clients",
            "In Use",
            "Demo",
            "TypeService",
            "Outcomes",
            xw::ELEMENT,
            "value",
        ])
        .context("select long-format columns")?;
    Ok(selected.rename(&[
        ("value".to_string(), long::VALUE.to_string()),
        (raw::GRANTEE_TYPE.to_string(), long::GRANT_TYPE.to_string()),
        (raw::POSTAL_CODE.to_string(), long::STATE.to_string()),
        (raw::FISCAL_YEAR.to_string(), long::YEAR.to_string()),
        (raw::PROG_ACRONYM.to_string(), long::PROGRAM_ACRONYM.to_string()),
    ]))
}

/// Narrative questions in long form: one row per submission and numbered
/// question, deduplicated on identical responses.
pub fn narrative_long(
    narrative: &Table,
    id_columns: &[String],
    crosswalk: &Crosswalk,
) -> Result<Table> {
    let renames: Vec<(String, String)> = resolve_renames(narrative.columns(), crosswalk)
        .into_iter()
        .collect();
    let df = narrative.rename(&renames);

    // Every numbered question the schema has ever carried melts here; the
    // per-epoch count only governs the summary-screen merge.
    let prefixes: Vec<String> = (1..=7).map(|n| format!("{n}. ")).collect();
    let ids: Vec<&str> = id_columns
        .iter()
        .map(String::as_str)
        .filter(|name| df.has_column(name))
        .collect();
    let question_columns: Vec<&str> = df
        .columns()
        .iter()
        .map(String::as_str)
        .filter(|name| {
            !ids.contains(name) && prefixes.iter().any(|prefix| name.contains(prefix.as_str()))
        })
        .collect();
    if question_columns.is_empty() {
        warn!("narrative screen has no numbered question columns");
    }

    let long = df
        .melt(&ids, &question_columns, "Narrative Question", "Response")
        .context("melt narrative questions")?;
    let mut dedupe_keys: Vec<&str> = ids.clone();
    dedupe_keys.push("Response");
    long.dedupe_by(&dedupe_keys, Keep::First)
        .context("dedupe narrative responses")
}

/// The four parallel summary-of-activities column families, melted to one
/// long table per priority area and outer-joined, with pipe-delimited
/// activity lists exploded into one row per activity.
pub fn activities_long(summary: &Table, id_columns: &[String]) -> Result<Table> {
    let ids: Vec<&str> = id_columns
        .iter()
        .map(String::as_str)
        .filter(|name| summary.has_column(name))
        .collect();

    let involvement = family_long(
        summary,
        &ids,
        "Involvement",
        "Level of Involvement",
        "Level of Involvement - ",
    )?;
    let short = family_long(
        summary,
        &ids,
        "Short Response",
        "Short Response",
        "Short Response (Involved and Highly Involved only) - ",
    )?;
    let types = family_long(
        summary,
        &ids,
        "Types of Activities",
        "Types of Activities",
        "Types of Activities - ",
    )?;
    let trained = family_long(
        summary,
        &ids,
        "Number of People Trained",
        "Number of People Trained",
        "Number of People Trained - ",
    )?;

    let mut area_keys: Vec<&str> = ids.clone();
    area_keys.push("Priority Area");
    let joined = involvement
        .join(&types, &area_keys, JoinKind::Outer)
        .context("join activity types onto involvement")?
        .join(&short, &area_keys, JoinKind::Outer)
        .context("join short responses")?
        .join(&trained, &area_keys, JoinKind::Outer)
        .context("join trained counts")?;

    joined
        .explode_with("Types of Activities", |value| match value.as_str() {
            Some(text) => text
                .split('|')
                .map(str::trim)
                .filter(|part| {
                    !part.is_empty()
                        && !part.eq_ignore_ascii_case("none")
                        && !part.eq_ignore_ascii_case("nan")
                })
                .map(Value::from)
                .collect(),
            None => Vec::new(),
        })
        .context("explode activity types")
}

/// Melt one column family (columns containing `marker`) into
/// (identifiers, Priority Area, value), stripping the family prefix from
/// the area name.
fn family_long(
    summary: &Table,
    ids: &[&str],
    marker: &str,
    value_name: &str,
    prefix: &str,
) -> Result<Table> {
    let family: Vec<&str> = summary
        .columns()
        .iter()
        .map(String::as_str)
        .filter(|name| name.contains(marker) && !ids.contains(name))
        .collect();
    let long = summary
        .melt(ids, &family, "Priority Area", value_name)
        .with_context(|| format!("melt {marker} columns"))?;
    let mut dedupe_keys: Vec<&str> = ids.to_vec();
    dedupe_keys.push("Priority Area");
    let long = long
        .dedupe_by(&dedupe_keys, Keep::First)
        .with_context(|| format!("dedupe {marker} rows"))?;
    Ok(long.map_column("Priority Area", |value| match value.as_str() {
        Some(text) => Value::from(text.replace(prefix, "")),
        None => value.clone(),
    }))
}
