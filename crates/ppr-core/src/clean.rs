//! Light cleanup applied to every screen before standardization.

use std::collections::BTreeMap;
use std::collections::HashMap;

use anyhow::{Context, Result};
use ppr_frame::{Table, Value};
use ppr_ingest::RawExtract;
use ppr_model::columns::raw;
use tracing::debug;

/// Clean each screen: map territories onto states (grantee population
/// only) and replace per-sheet grantee names with the one name Screen-1
/// reports for each EIN, so a grantee cannot appear under two spellings.
/// Column order is preserved; the shared identifier prefix stays intact.
pub fn prepare_screens(
    extract: &RawExtract,
    coalitions: bool,
) -> Result<BTreeMap<String, Table>> {
    let screen1 = extract.screen("Screen-1").context("load first screen")?;
    let unique_names = unique_grantee_names(screen1)?;

    let mut screens = BTreeMap::new();
    for (name, table) in &extract.screens {
        let mut df = table.clone();
        if !coalitions {
            df = df.map_column(raw::GRANTEE_TYPE, |value| match value.as_str() {
                Some("Territory") => Value::from("State"),
                _ => value.clone(),
            });
        }
        if let Some(names) = &unique_names
            && df.has_column(raw::GRANTEE_NAME)
            && df.has_column(raw::RPT_EIN)
        {
            let values: Vec<Value> = df
                .iter_rows()
                .map(|row| {
                    names
                        .get(&row.get(raw::RPT_EIN).group_key())
                        .cloned()
                        .unwrap_or(Value::Null)
                })
                .collect();
            df = df
                .with_column(raw::GRANTEE_NAME, values)
                .with_context(|| format!("unify grantee names on {name}"))?;
        }
        debug!(sheet = %name, rows = df.height(), "screen prepared");
        screens.insert(name.clone(), df);
    }
    Ok(screens)
}

/// First non-null grantee name per EIN, from Screen-1.
fn unique_grantee_names(screen1: &Table) -> Result<Option<HashMap<String, Value>>> {
    if !screen1.has_column(raw::RPT_EIN) || !screen1.has_column(raw::GRANTEE_NAME) {
        return Ok(None);
    }
    let firsts = screen1
        .group_first(&[raw::RPT_EIN], raw::GRANTEE_NAME)
        .context("collect unique grantee names")?;
    let mut names = HashMap::new();
    for row in firsts.iter_rows() {
        names.insert(
            row.get(raw::RPT_EIN).group_key(),
            row.get(raw::GRANTEE_NAME).clone(),
        );
    }
    Ok(Some(names))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn territory_maps_to_state_for_grantees_only() {
        let screen = Table::from_rows(
            [raw::RPT_EIN, raw::GRANTEE_NAME, raw::GRANTEE_TYPE],
            vec![vec![
                Value::from("[1 236003113 A1]"),
                Value::from("Guam"),
                Value::from("Territory"),
            ]],
        )
        .unwrap();
        let mut extract = RawExtract::default();
        extract.screens.insert("Screen-1".to_string(), screen);

        let grantee = prepare_screens(&extract, false).unwrap();
        assert_eq!(
            grantee["Screen-1"].value(0, raw::GRANTEE_TYPE).unwrap(),
            &Value::from("State")
        );

        let coalition = prepare_screens(&extract, true).unwrap();
        assert_eq!(
            coalition["Screen-1"].value(0, raw::GRANTEE_TYPE).unwrap(),
            &Value::from("Territory")
        );
    }

    #[test]
    fn grantee_names_unify_per_ein_in_place() {
        let screen1 = Table::from_rows(
            [raw::RPT_EIN, raw::GRANTEE_NAME, "Data"],
            vec![
                vec![Value::from("E1"), Value::from("First Spelling"), Value::Int(1)],
                vec![Value::from("E1"), Value::from("Second Spelling"), Value::Int(2)],
            ],
        )
        .unwrap();
        let mut extract = RawExtract::default();
        extract.screens.insert("Screen-1".to_string(), screen1);

        let screens = prepare_screens(&extract, false).unwrap();
        let prepared = &screens["Screen-1"];
        // Column order is untouched; values are unified.
        assert_eq!(prepared.columns(), &[raw::RPT_EIN, raw::GRANTEE_NAME, "Data"]);
        let names = prepared.column_values(raw::GRANTEE_NAME).unwrap();
        assert!(names.iter().all(|v| v == &Value::from("First Spelling")));
    }
}
