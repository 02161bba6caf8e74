//! End-to-end coalition pipeline over a small synthetic extract.

use ppr_core::{OutputSheet, run_coalition_pipeline};
use ppr_frame::{Table, Value};
use ppr_ingest::{LookupTables, RawExtract, crosswalk_from_table};
use ppr_model::{GroundTruth, SchemaEpoch, YearProgram};

/// Shared identifier prefix for every screen. The real export carries a
/// 41-column identifier block; the tail is padded with cover-page fields
/// that are constant per submission.
fn prefix_columns() -> Vec<String> {
    let mut columns: Vec<String> = [
        "Rpt-Receipt-Id",
        "Rpt-Status",
        "Screen-Name",
        "Row-Iteration",
        "Screen-Iteration",
        "RevSeqNumber",
        "SubmitDate",
        "PostalCode",
        "Fy",
        "ProgAcronym",
        "ProgramName",
        "DunsId9",
        "RptEin",
    ]
    .into_iter()
    .map(str::to_string)
    .collect();
    while columns.len() < 41 {
        columns.push(format!("Cover-Field-{}", columns.len()));
    }
    columns
}

fn prefix_row(iteration: i64, revision: i64) -> Vec<Value> {
    let mut row = vec![
        Value::from("R-100"),
        Value::from("Accepted"),
        Value::from("s1"),
        Value::Int(iteration),
        Value::Int(1),
        Value::Int(revision),
        Value::from("10/15/2023"),
        Value::from("AK"),
        Value::Int(2023),
        Value::from("Core FVPSA"),
        Value::from("Family Violence Prevention"),
        Value::from("D-1"),
        Value::from("E-1"),
    ];
    while row.len() < 41 {
        row.push(Value::from(format!("cover-{}", row.len())));
    }
    row
}

fn screen(extra_columns: &[&str], extra_values: Vec<Vec<Value>>) -> Table {
    let mut columns = prefix_columns();
    columns.extend(extra_columns.iter().map(|name| (*name).to_string()));
    let rows: Vec<Vec<Value>> = extra_values
        .into_iter()
        .enumerate()
        .map(|(idx, extras)| {
            let mut row = prefix_row(idx as i64 + 1, idx as i64 + 1);
            row.extend(extras);
            row
        })
        .collect();
    Table::from_rows(columns, rows).unwrap()
}

fn build_extract() -> RawExtract {
    let mut extract = RawExtract::default();
    // Two revisions of the one AK submission; revision 2 wins.
    extract.screens.insert(
        "Screen-1".to_string(),
        screen(
            &["COVER_NOTES"],
            vec![
                vec![Value::from("first draft")],
                vec![Value::from("final")],
            ],
        ),
    );
    extract.screens.insert(
        "Screen-2".to_string(),
        screen(&["FUNDS_TOTAL"], vec![vec![Value::Num(1000.0)]]),
    );
    extract.screens.insert(
        "Screen-3".to_string(),
        screen(&["MEMBER_COUNT"], vec![vec![Value::Int(14)]]),
    );
    extract.screens.insert(
        "Screen-4".to_string(),
        screen(
            &["NARR_Q1,IV,R1C1", "NARR_Q2,IV,R2C1"],
            vec![vec![
                Value::from("We expanded outreach."),
                Value::from("Funding gaps remain."),
            ]],
        ),
    );
    extract.screens.insert(
        "Screen-5".to_string(),
        screen(
            &[
                "INVOLVE,V,R1C1",
                "SHORTRESP,V,R1C2",
                "ACTTYPES,V,R1C3",
                "TRAINED,V,R1C4",
            ],
            vec![vec![
                Value::from("Highly Involved"),
                Value::from("Statewide training"),
                Value::from("Training | Events | none"),
                Value::from("35"),
            ]],
        ),
    );
    extract.screens.insert(
        "Screen-6".to_string(),
        screen(&["OTHER_TOPICS"], vec![vec![Value::from("None noted")]]),
    );
    extract.screens.insert(
        "Screen-7".to_string(),
        screen(&["TRAINING_EVENTS"], vec![vec![Value::Int(4)]]),
    );
    extract
}

fn build_lookups() -> LookupTables {
    let coalitions_tab = Table::from_rows(
        ["Meta Name Description", "Label", "Group_Description"],
        vec![
            vec![
                Value::from("NARR_Q1,IV,R1C1"),
                Value::from("1. What changed this year?"),
                Value::from("Narrative"),
            ],
            vec![
                Value::from("NARR_Q2,IV,R2C1"),
                Value::from("2. What challenges remain?"),
                Value::from("Narrative"),
            ],
            vec![
                Value::from("INVOLVE,V,R1C1"),
                Value::from("Level of Involvement - Outreach"),
                Value::from("Activities"),
            ],
            vec![
                Value::from("SHORTRESP,V,R1C2"),
                Value::from("Short Response (Involved and Highly Involved only) - Outreach"),
                Value::from("Activities"),
            ],
            vec![
                Value::from("ACTTYPES,V,R1C3"),
                Value::from("Types of Activities - Outreach"),
                Value::from("Activities"),
            ],
            vec![
                Value::from("TRAINED,V,R1C4"),
                Value::from("Number of People Trained - Outreach"),
                Value::from("Activities"),
            ],
        ],
    )
    .unwrap();
    LookupTables {
        lookup: Table::new(["Meta Name Description", "Element"]).unwrap(),
        field_names: Table::new(["Meta Name Description", "Label", "Element"]).unwrap(),
        subawardee: Table::new(["SubAwdCultSpecf"]).unwrap(),
        coalitions: crosswalk_from_table(&coalitions_tab).unwrap(),
    }
}

fn names() -> Table {
    Table::from_rows(
        ["State", "CoalitionName"],
        vec![
            vec![Value::from("AK"), Value::from("Alaska Coalition")],
            vec![Value::from("WY"), Value::from("Wyoming Coalition")],
        ],
    )
    .unwrap()
}

fn ground_truth() -> GroundTruth {
    GroundTruth {
        states: vec!["AK".to_string(), "WY".to_string()],
        year_programs: vec![YearProgram {
            year: "2023".to_string(),
            program: "Core FVPSA".to_string(),
        }],
    }
}

#[test]
fn coalition_pipeline_produces_sections_and_long_views() {
    let artifacts = run_coalition_pipeline(
        &build_extract(),
        &build_lookups(),
        &names(),
        &ground_truth(),
        &SchemaEpoch::legacy(),
    )
    .unwrap();

    let sheet_names: Vec<&str> = artifacts.sheets.iter().map(OutputSheet::name).collect();
    assert_eq!(
        sheet_names,
        vec![
            "I. Cover Page",
            "II. FVPSA Funds",
            "III. Coalition Members",
            "IV. Narrative Questions",
            "V. Summary of Activities",
            "VI. Other Topics",
            "VII. Training",
            "Section IV Narr Long Format",
            "Section V SoA Long Format",
        ]
    );

    let cover = match &artifacts.sheets[0] {
        OutputSheet::Table { table, .. } => table,
        OutputSheet::Grid { .. } => panic!("cover page should be tabular"),
    };
    // One reported submission (AK) and one missing coalition (WY).
    assert_eq!(cover.height(), 2);
    let ak = cover
        .iter_rows()
        .find(|row| row.get("State").as_str() == Some("AK"))
        .unwrap();
    assert_eq!(ak.get("Missing").as_bool(), Some(false));
    // Revision 2's cover notes survived standardization.
    assert_eq!(ak.get("COVER_NOTES").as_str(), Some("final"));
    let wy = cover
        .iter_rows()
        .find(|row| row.get("State").as_str() == Some("WY"))
        .unwrap();
    assert_eq!(wy.get("Missing").as_bool(), Some(true));
    assert!(wy.get("COVER_NOTES").is_null());
    assert_eq!(wy.get("CoalitionName").as_str(), Some("Wyoming Coalition"));

    let narrative = match &artifacts.sheets[7] {
        OutputSheet::Table { table, .. } => table,
        OutputSheet::Grid { .. } => panic!("narrative long should be tabular"),
    };
    assert!(narrative.has_column("Narrative Question"));
    assert!(narrative.has_column("Response"));
    let responses: Vec<String> = narrative
        .column_values("Response")
        .unwrap()
        .iter()
        .map(Value::text)
        .collect();
    assert!(responses.contains(&"We expanded outreach.".to_string()));

    let activities = match &artifacts.sheets[8] {
        OutputSheet::Table { table, .. } => table,
        OutputSheet::Grid { .. } => panic!("activities long should be tabular"),
    };
    // The pipe-delimited activity list exploded into Training and Events
    // for AK, plus the null row for missing WY.
    let ak_activities: Vec<String> = activities
        .iter_rows()
        .filter(|row| row.get("State").as_str() == Some("AK"))
        .map(|row| row.get("Types of Activities").text())
        .collect();
    assert_eq!(ak_activities, vec!["Training", "Events"]);
    let trained: Vec<Option<f64>> = activities
        .iter_rows()
        .filter(|row| row.get("State").as_str() == Some("AK"))
        .map(|row| row.get("Number of People Trained").as_f64())
        .collect();
    assert!(trained.iter().all(|value| *value == Some(35.0)));
}
