//! The curated wide view: pivoted labels plus computed gender totals and
//! grantee names.

use anyhow::{Context, Result};
use ppr_frame::{JoinKind, Table, Value};
use ppr_model::columns::{crosswalk as xw, derived, long, raw};
use tracing::debug;

use crate::text::unescape_entities;

const GENDERS: [&str; 4] = ["Men", "Women", "Children", "Not Specified"];

/// Pivot the joined long data into the wide sheet: one row per (grant
/// type, year, program, state, EIN), one column per crosswalk label, with
/// gender totals and the grantee name appended.
pub fn build_wide(joined_long: &Table, field_names: &Table, processed: &Table) -> Result<Table> {
    let labeled = joined_long
        .join(field_names, &[xw::ELEMENT], JoinKind::Left)
        .context("join field-name crosswalk")?;
    let labeled = labeled.filter(|row| !row.get(xw::LABEL).is_null());

    let index = [
        long::GRANT_TYPE,
        long::YEAR,
        long::PROGRAM_ACRONYM,
        long::STATE,
        long::EIN,
    ];
    let mut selected: Vec<&str> = index.to_vec();
    selected.push(xw::LABEL);
    selected.push(long::VALUE);
    let wide = labeled
        .select(&selected)
        .context("select wide-format columns")?
        .pivot(&index, xw::LABEL, long::VALUE)
        .context("pivot to wide format")?;

    let wide = calculate_gender_totals(&wide)?;

    let names: Vec<Value> = wide
        .iter_rows()
        .map(|row| lookup_name_from_ein(row.get(long::EIN), processed))
        .collect();
    let wide = wide.with_column(derived::GRANTEE_NAME, names)?;
    debug!(rows = wide.height(), columns = wide.width(), "wide format built");
    Ok(wide)
}

/// Per-gender and overall shelter/non-shelter totals.
///
/// Each gender total sums its shelter and non-shelter counts; the two grand
/// totals sum across genders. A total of zero means nothing was reported
/// and renders as null, not 0.
pub fn calculate_gender_totals(wide: &Table) -> Result<Table> {
    let mut df = wide.clone();
    let mut shelter_totals = vec![0.0; df.height()];
    let mut nonshelter_totals = vec![0.0; df.height()];

    for gender in GENDERS {
        let shelter_col = format!("Shelter {gender}");
        let nonshelter_col = format!("Non-shelter {gender}");
        let mut totals = vec![0.0; df.height()];
        for (idx, row) in df.iter_rows().enumerate() {
            if let Some(value) = row.get(&shelter_col).as_f64() {
                totals[idx] += value;
                shelter_totals[idx] += value;
            }
            if let Some(value) = row.get(&nonshelter_col).as_f64() {
                totals[idx] += value;
                nonshelter_totals[idx] += value;
            }
        }
        df = df.with_column(gender, zero_to_null(totals))?;
    }

    df = df.with_column(derived::SHELTER_TOTAL, zero_to_null(shelter_totals))?;
    df = df.with_column(derived::NONSHELTER_TOTAL, zero_to_null(nonshelter_totals))?;
    Ok(df)
}

fn zero_to_null(totals: Vec<f64>) -> Vec<Value> {
    totals
        .into_iter()
        .map(|total| {
            if total == 0.0 {
                Value::Null
            } else {
                Value::Num(total)
            }
        })
        .collect()
}

/// The grantee name of the most recent submission for an EIN, or null when
/// the EIN never reported in 2018 or later.
fn lookup_name_from_ein(ein: &Value, processed: &Table) -> Value {
    let key = ein.group_key();
    let mut best_year: Option<f64> = None;
    let mut best_name = Value::Null;
    for row in processed.iter_rows() {
        if row.get(long::EIN).group_key() != key {
            continue;
        }
        let Some(year) = row.get(raw::FISCAL_YEAR).as_f64() else {
            continue;
        };
        if best_year.is_none_or(|best| year > best) {
            best_year = Some(year);
            best_name = row.get(raw::GRANTEE_NAME).clone();
        }
    }
    match best_year {
        Some(year) if year >= 2018.0 => match best_name.as_str() {
            Some(text) => Value::Str(unescape_entities(text)),
            None => best_name,
        },
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_totals_treat_all_zero_as_null() {
        let wide = Table::from_rows(
            [
                long::EIN,
                "Shelter Women",
                "Non-shelter Women",
                "Shelter Men",
                "Non-shelter Men",
                "Shelter Children",
                "Non-shelter Children",
                "Shelter Not Specified",
                "Non-shelter Not Specified",
            ],
            vec![
                vec![
                    Value::from("E1"),
                    Value::Num(10.0),
                    Value::Num(5.0),
                    Value::Null,
                    Value::Num(2.0),
                    Value::Num(0.0),
                    Value::Null,
                    Value::Null,
                    Value::Null,
                ],
                vec![
                    Value::from("E2"),
                    Value::Num(0.0),
                    Value::Null,
                    Value::Null,
                    Value::Num(0.0),
                    Value::Null,
                    Value::Null,
                    Value::Null,
                    Value::Null,
                ],
            ],
        )
        .unwrap();
        let totals = calculate_gender_totals(&wide).unwrap();

        let e1 = totals.row(0);
        assert_eq!(e1.get("Women").as_f64(), Some(15.0));
        assert_eq!(e1.get("Men").as_f64(), Some(2.0));
        assert!(e1.get("Children").is_null());
        assert_eq!(e1.get(derived::SHELTER_TOTAL).as_f64(), Some(10.0));
        assert_eq!(e1.get(derived::NONSHELTER_TOTAL).as_f64(), Some(7.0));

        // A row with only zeros and nulls reports null totals, not zero.
        let e2 = totals.row(1);
        assert!(e2.get("Women").is_null());
        assert!(e2.get(derived::SHELTER_TOTAL).is_null());
        assert!(e2.get(derived::NONSHELTER_TOTAL).is_null());
    }

    #[test]
    fn grantee_name_comes_from_most_recent_year() {
        let processed = Table::from_rows(
            [long::EIN, raw::FISCAL_YEAR, raw::GRANTEE_NAME],
            vec![
                vec![Value::from("E1"), Value::Int(2019), Value::from("Old &amp; Stale")],
                vec![Value::from("E1"), Value::Int(2021), Value::from("New &amp; Fresh")],
                vec![Value::from("E2"), Value::Int(2016), Value::from("Too Early")],
            ],
        )
        .unwrap();
        assert_eq!(
            lookup_name_from_ein(&Value::from("E1"), &processed),
            Value::from("New & Fresh")
        );
        assert_eq!(
            lookup_name_from_ein(&Value::from("E2"), &processed),
            Value::Null
        );
        assert_eq!(
            lookup_name_from_ein(&Value::from("E3"), &processed),
            Value::Null
        );
    }
}
