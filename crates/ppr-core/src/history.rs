//! Historical long-table maintenance: year-level overwrite on append.

use std::collections::HashSet;

use anyhow::{Context, Result};
use ppr_frame::{Keep, Table, Value};
use ppr_model::columns::long;
use tracing::info;

// Three spellings of the same element have shipped over the years.
const GRANTEE_NAME_SYNONYMS: [&str; 2] = ["GRANTEE NAME", "GRANTEE_NAME"];
const GRANTEE_NAME_CANONICAL: &str = "GRANTEENAME";

/// Merge a new batch of long records into the historical table.
///
/// Every fiscal year present in the batch is overwritten wholesale: all
/// existing records for those years are dropped, then the batch is stacked
/// underneath the remainder. Incoming records win remaining ties because
/// the final dedupe keeps the last occurrence in stack order.
pub fn append_history(
    existing: Option<&Table>,
    incoming: &Table,
    batch_years: &[Value],
) -> Result<Table> {
    let years: HashSet<String> = batch_years.iter().map(Value::group_key).collect();

    let combined = match existing {
        Some(history) => {
            let retained =
                history.filter(|row| !years.contains(&row.get(long::YEAR).group_key()));
            let overwritten = history.height() - retained.height();
            info!(
                overwritten,
                incoming = incoming.height(),
                "overwriting historical years with the new batch"
            );
            retained.vstack(incoming)
        }
        None => incoming.clone(),
    };

    let normalized = combined.map_column(long::ELEMENT, |value| match value.as_str() {
        Some(text) => {
            let upper = text.to_uppercase();
            if GRANTEE_NAME_SYNONYMS.contains(&upper.as_str()) {
                Value::from(GRANTEE_NAME_CANONICAL)
            } else {
                Value::Str(upper)
            }
        }
        None => value.clone(),
    });

    normalized
        .dedupe_by(
            &[
                long::GRANT_TYPE,
                long::STATE,
                long::YEAR,
                long::EIN,
                long::ELEMENT,
            ],
            Keep::Last,
        )
        .context("dedupe historical long records")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: i64, element: &str, value: &str) -> Vec<Value> {
        vec![
            Value::from("State"),
            Value::from("AK"),
            Value::Int(year),
            Value::from("E1"),
            Value::from(element),
            Value::from(value),
        ]
    }

    fn table(rows: Vec<Vec<Value>>) -> Table {
        Table::from_rows(
            [
                long::GRANT_TYPE,
                long::STATE,
                long::YEAR,
                long::EIN,
                long::ELEMENT,
                long::VALUE,
            ],
            rows,
        )
        .unwrap()
    }

    #[test]
    fn batch_years_overwrite_existing_years_wholesale() {
        let existing = table(vec![
            record(2022, "CLIENTS", "old-2022"),
            record(2023, "CLIENTS", "old-2023"),
        ]);
        let incoming = table(vec![record(2022, "CLIENTS", "new-2022")]);
        let result =
            append_history(Some(&existing), &incoming, &[Value::Int(2022)]).unwrap();

        assert_eq!(result.height(), 2);
        let y2022 = result
            .iter_rows()
            .find(|row| row.get(long::YEAR).as_i64() == Some(2022))
            .unwrap();
        assert_eq!(y2022.get(long::VALUE).as_str(), Some("new-2022"));
        let y2023 = result
            .iter_rows()
            .find(|row| row.get(long::YEAR).as_i64() == Some(2023))
            .unwrap();
        assert_eq!(y2023.get(long::VALUE).as_str(), Some("old-2023"));
    }

    #[test]
    fn grantee_name_spellings_collapse_and_last_wins() {
        let existing = table(vec![record(2023, "Grantee Name", "Old Spelling")]);
        let incoming = table(vec![record(2023, "GRANTEENAME", "New Spelling")]);
        let result =
            append_history(Some(&existing), &incoming, &[Value::Int(2024)]).unwrap();

        // 2023 was not in the batch years, so both rows survive the year
        // overwrite; the synonym collapse makes them duplicates and the
        // incoming row wins.
        assert_eq!(result.height(), 1);
        assert_eq!(
            result.value(0, long::ELEMENT).unwrap(),
            &Value::from(GRANTEE_NAME_CANONICAL)
        );
        assert_eq!(
            result.value(0, long::VALUE).unwrap(),
            &Value::from("New Spelling")
        );
    }

    #[test]
    fn first_run_has_no_history() {
        let incoming = table(vec![record(2024, "CLIENTS", "v")]);
        let result = append_history(None, &incoming, &[Value::Int(2024)]).unwrap();
        assert_eq!(result.height(), 1);
    }
}
