//! Reading raw extract directories from disk.

use std::fs;

use ppr_frame::Value;
use ppr_ingest::{DataSource, DirExtractSource, IngestError, load_lookup_tables};

#[test]
fn extract_directory_loads_typed_screens() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("Screen-1.csv"),
        "Rpt-Receipt-Id,Fy,PostalCode,Amount,Zip\nR-1,2023,AK,12.5,01234\nR-2,2023,,nan,\n",
    )
    .unwrap();
    fs::write(dir.path().join("Screen-2.csv"), "Rpt-Receipt-Id,Q,Q\nR-1,a,b\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let extract = DirExtractSource::new(dir.path()).load().unwrap();
    assert_eq!(extract.screens.len(), 2);

    let screen1 = &extract.screens["Screen-1"];
    assert_eq!(screen1.value(0, "Fy").unwrap(), &Value::Int(2023));
    assert_eq!(screen1.value(0, "Amount").unwrap(), &Value::Num(12.5));
    // Leading-zero identifiers stay text; empty and nan cells are null.
    assert_eq!(screen1.value(0, "Zip").unwrap(), &Value::from("01234"));
    assert!(screen1.value(1, "PostalCode").unwrap().is_null());
    assert!(screen1.value(1, "Amount").unwrap().is_null());

    // Duplicate headers are mangled pandas-style.
    let screen2 = &extract.screens["Screen-2"];
    assert_eq!(screen2.columns(), &["Rpt-Receipt-Id", "Q", "Q.1"]);
}

#[test]
fn empty_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let result = DirExtractSource::new(dir.path()).load();
    assert!(matches!(result, Err(IngestError::MissingSheet(_))));
}

#[test]
fn missing_crosswalk_tab_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    // Only the lookup tab exists; the crosswalk tab is missing.
    fs::write(
        dir.path().join("lookup.csv"),
        "Element,Meta Name Description\nA,B\n",
    )
    .unwrap();
    let result = load_lookup_tables(dir.path());
    assert!(matches!(result, Err(IngestError::MissingSheet(_))));
}
