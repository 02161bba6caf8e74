//! Crosswalk resolution: raw column identifiers to output labels.

use std::collections::BTreeMap;

use ppr_model::Crosswalk;
use tracing::warn;

/// Resolve renames for every column present in both the input set and the
/// crosswalk (case-insensitive exact match; no fuzzy matching). Columns
/// absent from the crosswalk stay unrenamed and are treated as
/// non-reportable downstream.
///
/// When two raw identifiers map to the same label, applying the renames
/// lets the later column silently overwrite the earlier one. That policy is
/// inherited from the source system; the collision is logged here so it is
/// at least visible.
pub fn resolve_renames(columns: &[String], crosswalk: &Crosswalk) -> BTreeMap<String, String> {
    let mut renames = BTreeMap::new();
    let mut claimed: BTreeMap<String, String> = BTreeMap::new();
    for column in columns {
        let Some(label) = crosswalk.label_for(column) else {
            continue;
        };
        if let Some(earlier) = claimed.get(label) {
            warn!(
                label = %label,
                earlier = %earlier,
                later = %column,
                "crosswalk collision: two raw columns share one label"
            );
        }
        claimed.insert(label.to_string(), column.clone());
        renames.insert(column.clone(), label.to_string());
    }
    renames
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppr_model::CrosswalkEntry;

    fn crosswalk(pairs: &[(&str, &str)]) -> Crosswalk {
        Crosswalk::new(
            pairs
                .iter()
                .map(|(raw, label)| CrosswalkEntry {
                    raw_name: (*raw).to_string(),
                    label: (*label).to_string(),
                    group: String::new(),
                })
                .collect(),
        )
    }

    #[test]
    fn matches_are_case_insensitive_and_exact() {
        let xw = crosswalk(&[("RAW NAME,R1C1", "Nice Label")]);
        let columns = vec!["raw name,r1c1".to_string(), "Other".to_string()];
        let renames = resolve_renames(&columns, &xw);
        assert_eq!(renames.len(), 1);
        assert_eq!(
            renames.get("raw name,r1c1").map(String::as_str),
            Some("Nice Label")
        );
    }

    #[test]
    fn collisions_still_rename_both_columns() {
        let xw = crosswalk(&[("A,R1C1", "Label"), ("B,R2C1", "Label")]);
        let columns = vec!["A,R1C1".to_string(), "B,R2C1".to_string()];
        let renames = resolve_renames(&columns, &xw);
        assert_eq!(renames.len(), 2);
        assert!(renames.values().all(|label| label == "Label"));
    }
}
