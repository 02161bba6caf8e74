//! The coverage/metadata sheet: a positioned cell grid, not a table.

use anyhow::Result;
use chrono::NaiveDate;
use ppr_frame::{Table, Value};
use ppr_model::columns::{long, raw};

/// Build the status-code count grid from the unfiltered processed data:
/// one column per (year, grantee type, program) combination over the full
/// cross product, one row per submission status code, zero-filled.
pub fn build_status_counts(processed: &Table) -> Result<Vec<Vec<Value>>> {
    let counts = processed.group_count(
        &[raw::FISCAL_YEAR, raw::GRANTEE_TYPE, raw::CODE_TXT, raw::PROG_ACRONYM],
        "count",
    )?;

    let mut years = processed.unique_values(raw::FISCAL_YEAR)?;
    years.sort_by(Value::compare);
    let mut types = processed.unique_values(raw::GRANTEE_TYPE)?;
    types.sort_by(Value::compare);
    let mut programs = processed.unique_values(raw::PROG_ACRONYM)?;
    programs.sort_by(Value::compare);
    let mut codes = processed.unique_values(raw::CODE_TXT)?;
    codes.sort_by(Value::compare);

    let lookup = |year: &Value, ty: &Value, code: &Value, program: &Value| -> i64 {
        for row in counts.iter_rows() {
            if row.get(raw::FISCAL_YEAR).group_key() == year.group_key()
                && row.get(raw::GRANTEE_TYPE).group_key() == ty.group_key()
                && row.get(raw::CODE_TXT).group_key() == code.group_key()
                && row.get(raw::PROG_ACRONYM).group_key() == program.group_key()
            {
                return row.get("count").as_i64().unwrap_or(0);
            }
        }
        0
    };

    let mut header_year = vec![Value::from("Year")];
    let mut header_type = vec![Value::from("Grantee Type")];
    let mut header_program = vec![Value::from("Program")];
    for year in &years {
        for ty in &types {
            for program in &programs {
                header_year.push(year.clone());
                header_type.push(ty.clone());
                header_program.push(program.clone());
            }
        }
    }

    let mut grid = vec![header_year, header_type, header_program];
    for code in &codes {
        let mut row = vec![code.clone()];
        for year in &years {
            for ty in &types {
                for program in &programs {
                    row.push(Value::Int(lookup(year, ty, code, program)));
                }
            }
        }
        grid.push(row);
    }
    Ok(grid)
}

/// Assemble the metadata sheet grid.
///
/// Fixed cells: the last-processing timestamp in the first column, the
/// year-indexed reporting counts and missing-state lists from the fourth
/// column on, and the status-count grid offset to the right of the year
/// table by the span of observed years.
pub fn build_metadata_grid(
    wide: &Table,
    roster: &[String],
    status_counts: &[Vec<Value>],
    today: NaiveDate,
) -> Result<Vec<Vec<Value>>> {
    let mut years = wide.unique_values(long::YEAR)?;
    years.sort_by(Value::compare);

    // Per-year reporting stats.
    let mut state_counts = Vec::with_capacity(years.len());
    let mut tribe_counts = Vec::with_capacity(years.len());
    let mut missing_lists: Vec<Vec<String>> = Vec::with_capacity(years.len());
    for year in &years {
        let year_key = year.group_key();
        let in_year = wide.filter(|row| row.get(long::YEAR).group_key() == year_key);
        let states = in_year.filter(|row| row.get(long::GRANT_TYPE).as_str() == Some("State"));
        let tribes = in_year.filter(|row| row.get(long::GRANT_TYPE).as_str() == Some("Tribe"));
        state_counts.push(states.unique_values(long::EIN)?.len());
        tribe_counts.push(tribes.unique_values(long::EIN)?.len());

        let present: Vec<String> = states
            .unique_values(long::STATE)?
            .iter()
            .map(Value::text)
            .collect();
        let mut missing: Vec<String> = roster
            .iter()
            .filter(|state| !present.contains(state))
            .cloned()
            .collect();
        missing.sort();
        missing_lists.push(missing);
    }

    let longest_missing = missing_lists.iter().map(Vec::len).max().unwrap_or(0);
    let year_span = years.len();
    // Status grid starts to the right of the year table, leaving room for
    // the missing-grantee lists.
    let status_offset = 5 + year_span.saturating_sub(1);
    let status_width = status_counts.iter().map(Vec::len).max().unwrap_or(0);
    let height = (4 + longest_missing).max(status_counts.len()).max(2);
    let width = (status_offset + status_width).max(4 + year_span);

    let mut grid = vec![vec![Value::Null; width]; height];
    grid[0][0] = Value::from("Last data processing:");
    grid[1][0] = Value::from(today.format("%Y-%m-%d").to_string());
    grid[0][2] = Value::from("Year");
    grid[1][2] = Value::from("Number of states reporting");
    grid[2][2] = Value::from("Number of tribes reporting");
    grid[3][2] = Value::from("List of missing states");

    for (idx, year) in years.iter().enumerate() {
        let col = 3 + idx;
        grid[0][col] = year.clone();
        grid[1][col] = Value::Int(state_counts[idx] as i64);
        grid[2][col] = Value::Int(tribe_counts[idx] as i64);
        for (offset, state) in missing_lists[idx].iter().enumerate() {
            grid[3 + offset][col] = Value::from(state.as_str());
        }
    }

    for (row_idx, status_row) in status_counts.iter().enumerate() {
        for (col_idx, value) in status_row.iter().enumerate() {
            grid[row_idx][status_offset + col_idx] = value.clone();
        }
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide() -> Table {
        Table::from_rows(
            [long::GRANT_TYPE, long::YEAR, long::STATE, long::EIN],
            vec![
                vec![
                    Value::from("State"),
                    Value::Int(2023),
                    Value::from("AK"),
                    Value::from("E1"),
                ],
                vec![
                    Value::from("Tribe"),
                    Value::Int(2023),
                    Value::from("OK"),
                    Value::from("E2"),
                ],
            ],
        )
        .unwrap()
    }

    #[test]
    fn metadata_grid_reports_counts_and_missing_states() {
        let roster = vec!["AK".to_string(), "AL".to_string()];
        let today = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let grid = build_metadata_grid(&wide(), &roster, &[], today).unwrap();

        assert_eq!(grid[0][0], Value::from("Last data processing:"));
        assert_eq!(grid[1][0], Value::from("2024-01-31"));
        assert_eq!(grid[0][3], Value::Int(2023));
        // One state and one tribe reported.
        assert_eq!(grid[1][3], Value::Int(1));
        assert_eq!(grid[2][3], Value::Int(1));
        // AL never reported.
        assert_eq!(grid[3][3], Value::from("AL"));
    }

    #[test]
    fn status_counts_cover_the_full_cross_product() {
        let processed = Table::from_rows(
            [raw::FISCAL_YEAR, raw::GRANTEE_TYPE, raw::CODE_TXT, raw::PROG_ACRONYM],
            vec![
                vec![
                    Value::Int(2023),
                    Value::from("State"),
                    Value::from("Submitted"),
                    Value::from("FVPS"),
                ],
                vec![
                    Value::Int(2023),
                    Value::from("Tribe"),
                    Value::from("Submission Accepted by CO"),
                    Value::from("FVPS"),
                ],
            ],
        )
        .unwrap();
        let grid = build_status_counts(&processed).unwrap();
        // 3 header rows + 2 status codes.
        assert_eq!(grid.len(), 5);
        // Label column + (1 year x 2 types x 1 program).
        assert_eq!(grid[0].len(), 3);
        // Every (code, combo) cell is filled, zeros included.
        let total: i64 = grid[3..]
            .iter()
            .flat_map(|row| row[1..].iter())
            .filter_map(Value::as_i64)
            .sum();
        assert_eq!(total, 2);
    }
}
