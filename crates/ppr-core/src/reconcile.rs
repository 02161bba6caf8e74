//! Missing-submission reconciliation against the enumerated ground truth.

use anyhow::{Context, Result};
use ppr_frame::{JoinKind, Keep, Table, Value};
use ppr_model::ExpectedSubmission;
use ppr_model::columns::{derived, renamed};
use tracing::debug;

/// Legacy program codes that still appear in old submissions. Fixed by the
/// program office, not user-configurable.
const PROGRAM_ALIASES: [(&str, &str); 3] = [
    ("SDVC", "Core FVPSA"),
    ("SDC6", "ARP Act"),
    ("SDC3", "CARES Act"),
];

const EXPECTED_PROGRAM: &str = "Coal Program Abbr";

/// Collapse legacy program codes onto their canonical abbreviation.
pub fn normalize_program_aliases(table: &Table) -> Table {
    table.map_column(renamed::PROGRAM_ABBR, |value| match value.as_str() {
        Some(text) => {
            for (alias, canonical) in PROGRAM_ALIASES {
                if text == alias {
                    return Value::from(canonical);
                }
            }
            value.clone()
        }
        None => value.clone(),
    })
}

/// Right-outer-join a standardized screen onto the expected submission set.
///
/// Every expected (state, year, program) combination appears in the result:
/// rows with actual data carry `Missing = false`, combinations that never
/// reported carry `Missing = true` with all screen columns null. Duplicates
/// resolve in favor of the actual row. The display name is re-attached last
/// so missing rows are still named.
pub fn reconcile_missing(
    screen: &Table,
    expected: &[ExpectedSubmission],
    id_columns: &[String],
    names: &Table,
) -> Result<Table> {
    let ids: Vec<&str> = id_columns.iter().map(String::as_str).collect();

    let mut df = screen.with_column(
        derived::MISSING,
        vec![Value::Bool(false); screen.height()],
    )?;
    df = normalize_program_aliases(&df);
    df = df.map_column(renamed::YEAR, |value| match value {
        Value::Null => Value::Null,
        other => Value::Str(other.text()),
    });
    df = df.dedupe_by(&ids, Keep::First).context("dedupe submissions")?;

    let mut expected_table = Table::new([renamed::STATE, renamed::YEAR, EXPECTED_PROGRAM])
        .context("build expected table")?;
    for row in expected {
        expected_table.push_row(vec![
            Value::from(row.state.as_str()),
            Value::from(row.year.as_str()),
            Value::from(row.program.as_str()),
        ])?;
    }

    // Actual rows precede the appended unmatched expected rows, so the
    // dedupe below prefers the non-missing row of a duplicate pair.
    let mut joined = df
        .join_on(
            &expected_table,
            &[renamed::STATE, renamed::YEAR, renamed::PROGRAM_ABBR],
            &[renamed::STATE, renamed::YEAR, EXPECTED_PROGRAM],
            JoinKind::Right,
        )
        .context("join expected submissions")?;
    joined = joined
        .drop_columns(&[renamed::PROGRAM_ABBR])
        .rename_one(EXPECTED_PROGRAM, renamed::PROGRAM_ABBR);
    joined = joined.map_column(derived::MISSING, |value| match value {
        Value::Bool(false) => Value::Bool(false),
        _ => Value::Bool(true),
    });
    joined = joined.dedupe_by(&ids, Keep::First).context("dedupe reconciled rows")?;

    joined = joined
        .drop_columns(&[derived::COALITION_NAME])
        .join(names, &[renamed::STATE], JoinKind::Left)
        .context("re-attach display names")?;

    let missing = joined
        .iter_rows()
        .filter(|row| row.get(derived::MISSING).as_bool() == Some(true))
        .count();
    debug!(rows = joined.height(), missing, "screen reconciled");
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected() -> Vec<ExpectedSubmission> {
        ["AK", "WY"]
            .into_iter()
            .map(|state| ExpectedSubmission {
                state: state.to_string(),
                year: "2023".to_string(),
                program: "Core FVPSA".to_string(),
            })
            .collect()
    }

    fn names() -> Table {
        Table::from_rows(
            [renamed::STATE, derived::COALITION_NAME],
            vec![
                vec![Value::from("AK"), Value::from("Alaska Coalition")],
                vec![Value::from("WY"), Value::from("Wyoming Coalition")],
            ],
        )
        .unwrap()
    }

    fn screen() -> Table {
        Table::from_rows(
            [renamed::STATE, renamed::YEAR, renamed::PROGRAM_ABBR, "Data"],
            vec![vec![
                Value::from("AK"),
                Value::Int(2023),
                Value::from("SDVC"),
                Value::Int(7),
            ]],
        )
        .unwrap()
    }

    #[test]
    fn every_expected_combination_appears_exactly_once() {
        let ids = vec![
            renamed::STATE.to_string(),
            renamed::YEAR.to_string(),
            renamed::PROGRAM_ABBR.to_string(),
        ];
        let result = reconcile_missing(&screen(), &expected(), &ids, &names()).unwrap();
        assert_eq!(result.height(), 2);

        let ak = result
            .iter_rows()
            .find(|row| row.get(renamed::STATE).as_str() == Some("AK"))
            .unwrap();
        assert_eq!(ak.get(derived::MISSING).as_bool(), Some(false));
        assert_eq!(ak.get("Data").as_i64(), Some(7));
        // The SDVC alias resolved onto the canonical program.
        assert_eq!(ak.get(renamed::PROGRAM_ABBR).as_str(), Some("Core FVPSA"));

        let wy = result
            .iter_rows()
            .find(|row| row.get(renamed::STATE).as_str() == Some("WY"))
            .unwrap();
        assert_eq!(wy.get(derived::MISSING).as_bool(), Some(true));
        assert!(wy.get("Data").is_null());
        assert_eq!(
            wy.get(derived::COALITION_NAME).as_str(),
            Some("Wyoming Coalition")
        );
    }
}
