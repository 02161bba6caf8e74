//! Reconciliation completeness: every expected combination appears exactly
//! once, flagged correctly.

use ppr_core::reconcile_missing;
use ppr_frame::{Table, Value};
use ppr_model::ExpectedSubmission;

fn expected_set() -> Vec<ExpectedSubmission> {
    let mut rows = Vec::new();
    for state in ["AK", "AL", "WY"] {
        for (year, program) in [("2022", "Core FVPSA"), ("2022", "ARP Act")] {
            rows.push(ExpectedSubmission {
                state: state.to_string(),
                year: year.to_string(),
                program: program.to_string(),
            });
        }
    }
    rows
}

fn names() -> Table {
    let rows = ["AK", "AL", "WY"]
        .into_iter()
        .map(|state| {
            vec![
                Value::from(state),
                Value::from(format!("{state} Coalition")),
            ]
        })
        .collect();
    Table::from_rows(["State", "CoalitionName"], rows).unwrap()
}

fn actual() -> Table {
    Table::from_rows(
        ["State", "Year", "Program Abbr", "Members"],
        vec![
            vec![
                Value::from("AK"),
                Value::Int(2022),
                Value::from("Core FVPSA"),
                Value::Int(12),
            ],
            // Duplicate submission rows for the same key; the reconciler
            // must fold them to one.
            vec![
                Value::from("AK"),
                Value::Int(2022),
                Value::from("Core FVPSA"),
                Value::Int(99),
            ],
            // Legacy alias resolves onto ARP Act.
            vec![
                Value::from("AL"),
                Value::Int(2022),
                Value::from("SDC6"),
                Value::Int(3),
            ],
        ],
    )
    .unwrap()
}

#[test]
fn every_expected_combination_appears_exactly_once() {
    let ids = vec![
        "State".to_string(),
        "Year".to_string(),
        "Program Abbr".to_string(),
    ];
    let result = reconcile_missing(&actual(), &expected_set(), &ids, &names()).unwrap();
    assert_eq!(result.height(), expected_set().len());

    for expected in expected_set() {
        let matches: Vec<_> = result
            .iter_rows()
            .filter(|row| {
                row.get("State").as_str() == Some(expected.state.as_str())
                    && row.get("Year").text() == expected.year
                    && row.get("Program Abbr").as_str() == Some(expected.program.as_str())
            })
            .collect();
        assert_eq!(
            matches.len(),
            1,
            "expected one row for {}/{}/{}",
            expected.state,
            expected.year,
            expected.program
        );
        let row = &matches[0];
        let missing = row.get("Missing").as_bool().unwrap();
        if missing {
            assert!(row.get("Members").is_null());
        } else {
            assert!(!row.get("Members").is_null());
        }
        // Missing rows still carry a display name.
        assert!(row.get("CoalitionName").as_str().is_some());
    }

    // The two actuals are non-missing; the duplicate resolved in favor of
    // the first actual row.
    let reported = result
        .iter_rows()
        .filter(|row| row.get("Missing").as_bool() == Some(false))
        .count();
    assert_eq!(reported, 2);
    let ak = result
        .iter_rows()
        .find(|row| {
            row.get("State").as_str() == Some("AK")
                && row.get("Missing").as_bool() == Some(false)
        })
        .unwrap();
    assert_eq!(ak.get("Members").as_i64(), Some(12));
}
