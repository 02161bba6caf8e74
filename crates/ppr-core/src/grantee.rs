//! Canonicalization of the grantee (state/tribe) population.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use ppr_frame::{JoinKind, Table, Value};
use ppr_model::SchemaEpoch;
use ppr_model::columns::raw;
use tracing::{debug, info};

use crate::sheets::fix_duplicate_columns;
use crate::standardize::parse_submit_dates;
use crate::text::unescape_table_text;

/// Canonicalized grantee submissions.
#[derive(Debug, Clone)]
pub struct GranteeData {
    /// Joined screens before any row filtering (feeds the status counts).
    pub processed: Table,
    /// One row per (year, EIN, program), duplicate submissions resolved.
    pub filtered: Table,
    /// The columns the two screens were joined on.
    pub join_columns: Vec<String>,
}

impl GranteeData {
    pub fn states(&self) -> Table {
        self.filtered
            .filter(|row| row.get(raw::GRANTEE_TYPE).as_str() == Some("State"))
    }

    pub fn tribes(&self) -> Table {
        self.filtered
            .filter(|row| row.get(raw::GRANTEE_TYPE).as_str() == Some("Tribe"))
    }
}

/// Join the cover and data screens and resolve every grantee down to one
/// canonical submission row.
///
/// Precedence: rows returned for edits are dropped, then the maximum
/// revision sequence number per (year, EIN, program) wins, `Other` grantee
/// types are excluded, and state rows with two EINs for the same program
/// and year resolve to the latest submission date.
pub fn canonicalize_grantee_submissions(
    screens: &BTreeMap<String, Table>,
    epoch: &SchemaEpoch,
) -> Result<GranteeData> {
    let screen1 = screens
        .get("Screen-1")
        .context("expected sheet not found: Screen-1")?;
    let screen3 = screens
        .get("Screen-3")
        .context("expected sheet not found: Screen-3")?;

    let prefix_end = screen1.width().min(43);
    let join_columns: Vec<String> = screen1.columns()[..prefix_end]
        .iter()
        .filter(|name| name.as_str() != raw::SCREEN_NAME)
        .cloned()
        .collect();
    let join_refs: Vec<&str> = join_columns.iter().map(String::as_str).collect();

    let mut processed = screen1
        .join(screen3, &join_refs, JoinKind::Inner)
        .context("join cover and data screens")?;
    processed = unescape_table_text(&processed);

    // The canonical EIN comes from RptEin with brackets and spaces removed.
    let eins: Vec<Value> = processed
        .iter_rows()
        .map(|row| match row.get(raw::RPT_EIN).as_str() {
            Some(text) => Value::from(parse_ein(text)),
            None => Value::Null,
        })
        .collect();
    processed = processed.with_column(raw::EIN, eins)?;
    debug!(rows = processed.height(), "grantee screens joined");

    let mut filtered = processed.filter(|row| {
        row.get(raw::CODE_TXT).as_str() != Some("Submission Returned by CO")
    });
    filtered = filtered
        .retain_group_max(&[raw::FISCAL_YEAR, raw::EIN, raw::PROG_ACRONYM], raw::REV_SEQ_NUMBER)
        .context("narrow grantees by revision number")?;
    filtered = filtered.filter(|row| row.get(raw::GRANTEE_TYPE).as_str() != Some("Other"));

    let states = filtered.filter(|row| row.get(raw::GRANTEE_TYPE).as_str() == Some("State"));
    let states = parse_submit_dates(&states, "Screen-1")?;
    let states = states
        .retain_group_max(
            &[raw::POSTAL_CODE, raw::FISCAL_YEAR, raw::PROG_ACRONYM],
            raw::SUBMIT_DATE,
        )
        .context("narrow states by submission date")?;
    let tribes = filtered.filter(|row| row.get(raw::GRANTEE_TYPE).as_str() == Some("Tribe"));
    let mut filtered = states.vstack(&tribes);

    filtered = fix_duplicate_columns(&filtered, &epoch.grantee_duplicate_fixes);
    filtered = filtered.drop_columns(&["Screen-Name_x", "Screen-Name_y"]);
    info!(rows = filtered.height(), "grantee submissions canonicalized");

    Ok(GranteeData {
        processed,
        filtered,
        join_columns,
    })
}

/// Strip the brackets and spaces from a raw report EIN:
/// `[1 236003113 A1]` becomes `1236003113A1`.
pub fn parse_ein(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() < 8 {
        return raw.trim().to_string();
    }
    let mut ein = String::new();
    ein.extend(&chars[1..2]);
    ein.extend(&chars[3..chars.len() - 4]);
    ein.extend(&chars[chars.len() - 3..chars.len() - 1]);
    ein
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ein_strips_brackets_and_spaces() {
        assert_eq!(parse_ein("[1 236003113 A1]"), "1236003113A1");
    }

    #[test]
    fn canonicalization_resolves_duplicates() {
        let row_base = |rev: i64, code: &str, date: &str| -> Vec<Value> {
            vec![
                Value::from("s1"),
                Value::Int(2023),
                Value::from("AK"),
                Value::from("FVPS"),
                Value::from("[1 236003113 A1]"),
                Value::from("State"),
                Value::from(code),
                Value::Int(rev),
                Value::from(date),
                Value::from("Grantee &amp; Co"),
            ]
        };
        let columns = [
            raw::SCREEN_NAME,
            raw::FISCAL_YEAR,
            raw::POSTAL_CODE,
            raw::PROG_ACRONYM,
            raw::RPT_EIN,
            raw::GRANTEE_TYPE,
            raw::CODE_TXT,
            raw::REV_SEQ_NUMBER,
            raw::SUBMIT_DATE,
            raw::GRANTEE_NAME,
        ];
        let screen1 = Table::from_rows(
            columns,
            vec![
                row_base(1, "Submitted", "10/01/2023"),
                row_base(2, "Submitted", "10/02/2023"),
                row_base(3, "Submission Returned by CO", "10/03/2023"),
            ],
        )
        .unwrap();
        // Screen-3 shares the identifier prefix and adds a data column.
        let mut screen3 = screen1.clone();
        screen3 = screen3
            .with_column("Data", vec![Value::Int(7); screen3.height()])
            .unwrap();

        let mut screens = BTreeMap::new();
        screens.insert("Screen-1".to_string(), screen1);
        screens.insert("Screen-3".to_string(), screen3);

        let result =
            canonicalize_grantee_submissions(&screens, &SchemaEpoch::legacy()).unwrap();
        // The returned-for-edits row drops; revision 2 wins.
        assert_eq!(result.filtered.height(), 1);
        let row = result.filtered.row(0);
        assert_eq!(row.get(raw::REV_SEQ_NUMBER).as_i64(), Some(2));
        assert_eq!(row.get(raw::EIN).as_str(), Some("1236003113A1"));
        // Text cells are unescaped after the join.
        assert_eq!(row.get(raw::GRANTEE_NAME).as_str(), Some("Grantee & Co"));
        assert_eq!(result.processed.height(), 3);
    }
}
