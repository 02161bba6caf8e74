//! Subawardee processing and shelter/non-shelter funding totals.

use std::collections::HashSet;

use anyhow::{Context, Result};
use ppr_frame::{JoinKind, Table, Value};
use ppr_model::columns::{crosswalk as xw, derived, raw};
use tracing::debug;

use crate::text::unescape_table_text;

const CATEGORY_COLUMN: &str =
    "Subawardee List - Underserved or culturally- and linguistically-specific population";
const SUBAWARDEE_TYPE: &str = "Subawardee List - Type of Subawardee";
const FUNDING_AMOUNT: &str = "Subawardee List - FVPSA Funding Amount";

// The maze-grid headers carry their grid coordinates; the output sheet uses
// readable names.
const GRID_RENAMES: [(&str, &str); 2] = [
    (
        "II Text - FVPSA Funding Type,PPR FVPSA Subawardee - Maze Grid Input Row",
        "Subawardee - FVPSA Funding Type",
    ),
    (
        "II Text - Primary Services Type,PPR FVPSA Subawardee - Maze Grid Input Row",
        "Subawardee - FVPSA Primary Services Type",
    ),
];

/// Clean the subawardee screen, attach the category lookup, and keep only
/// the rows whose receipt id maps to a grantee in the processed data.
pub fn process_subawardee_data(
    subawardee_screen: &Table,
    subawardee_lookup: &Table,
    receipt_ids: &[Value],
) -> Result<Table> {
    let mut df = unescape_table_text(subawardee_screen);
    let renames: Vec<(String, String)> = GRID_RENAMES
        .iter()
        .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
        .collect();
    df = df.rename(&renames);

    df = df
        .join_on(
            subawardee_lookup,
            &[CATEGORY_COLUMN],
            &[xw::SUBAWARDEE_CATEGORY],
            JoinKind::Left,
        )
        .context("attach subawardee category lookup")?;

    let keep: HashSet<String> = receipt_ids.iter().map(Value::group_key).collect();
    let filtered = df.filter(|row| keep.contains(&row.get(raw::RECEIPT_ID).group_key()));
    debug!(rows = filtered.height(), "subawardee rows retained");
    Ok(filtered)
}

/// Total subawardee funding by state, year, and program, split shelter vs
/// non-shelter, appended to the state grantee data as the two engineered
/// `SUBAWARDEE_*_TOTAL` columns. Only states subaward, so the totals are
/// computed from state rows only.
pub fn calculate_total_funds(
    subawardee: &Table,
    states: &Table,
    merge_columns: &[String],
) -> Result<Table> {
    let state_rows = subawardee.filter(|row| row.get(raw::GRANTEE_TYPE).as_str() == Some("State"));
    let shelter_type: Vec<Value> = state_rows
        .iter_rows()
        .map(|row| {
            let is_shelter = row
                .get(SUBAWARDEE_TYPE)
                .as_str()
                .is_some_and(|text| text.to_uppercase() == "SHELTER");
            Value::from(if is_shelter { "Shelter" } else { "Non-Shelter" })
        })
        .collect();
    let state_rows = state_rows
        .with_column(derived::SHELTER_TYPE, shelter_type)
        .context("standardize shelter type")?;

    let merge_refs: Vec<&str> = merge_columns
        .iter()
        .map(String::as_str)
        .filter(|name| states.has_column(name) && state_rows.has_column(name))
        .collect();
    let joined = states
        .join(&state_rows, &merge_refs, JoinKind::Left)
        .context("join subawardee rows onto state data")?;

    let totals = state_rows
        .group_sum(
            &[raw::FISCAL_YEAR, raw::POSTAL_CODE, raw::PROG_ACRONYM, derived::SHELTER_TYPE],
            FUNDING_AMOUNT,
            "total",
        )
        .context("sum subawardee funding")?
        .pivot(
            &[raw::FISCAL_YEAR, raw::POSTAL_CODE, raw::PROG_ACRONYM],
            derived::SHELTER_TYPE,
            "total",
        )
        .context("pivot shelter totals")?;
    // Absent categories sum to zero, not null.
    let mut totals = totals;
    for column in ["Shelter", "Non-Shelter"] {
        if totals.has_column(column) {
            totals = totals.map_column(column, |value| match value {
                Value::Null => Value::Num(0.0),
                other => other.clone(),
            });
        }
    }
    let totals = totals.rename(&[
        ("Shelter".to_string(), derived::SUBAWARDEE_SHELTER_TOTAL.to_string()),
        ("Non-Shelter".to_string(), derived::SUBAWARDEE_NONSHELTER_TOTAL.to_string()),
    ]);

    joined
        .join(
            &totals,
            &[raw::FISCAL_YEAR, raw::POSTAL_CODE, raw::PROG_ACRONYM],
            JoinKind::Left,
        )
        .context("append funding totals to state data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_split_shelter_and_non_shelter() {
        let subawardee = Table::from_rows(
            [
                raw::GRANTEE_TYPE,
                raw::FISCAL_YEAR,
                raw::POSTAL_CODE,
                raw::PROG_ACRONYM,
                SUBAWARDEE_TYPE,
                FUNDING_AMOUNT,
            ],
            vec![
                vec![
                    Value::from("State"),
                    Value::Int(2023),
                    Value::from("AK"),
                    Value::from("FVPS"),
                    Value::from("SHELTER"),
                    Value::Num(100.0),
                ],
                vec![
                    Value::from("State"),
                    Value::Int(2023),
                    Value::from("AK"),
                    Value::from("FVPS"),
                    Value::from("Community program"),
                    Value::Num(40.0),
                ],
                vec![
                    Value::from("State"),
                    Value::Int(2023),
                    Value::from("AK"),
                    Value::from("FVPS"),
                    Value::from("Shelter"),
                    Value::Num(25.0),
                ],
            ],
        )
        .unwrap();
        let states = Table::from_rows(
            [raw::FISCAL_YEAR, raw::POSTAL_CODE, raw::PROG_ACRONYM, "Data"],
            vec![vec![
                Value::Int(2023),
                Value::from("AK"),
                Value::from("FVPS"),
                Value::Int(1),
            ]],
        )
        .unwrap();
        let merge = vec![
            raw::FISCAL_YEAR.to_string(),
            raw::POSTAL_CODE.to_string(),
            raw::PROG_ACRONYM.to_string(),
        ];
        let result = calculate_total_funds(&subawardee, &states, &merge).unwrap();
        let row = result.row(0);
        assert_eq!(
            row.get(derived::SUBAWARDEE_SHELTER_TOTAL).as_f64(),
            Some(125.0)
        );
        assert_eq!(
            row.get(derived::SUBAWARDEE_NONSHELTER_TOTAL).as_f64(),
            Some(40.0)
        );
    }
}
