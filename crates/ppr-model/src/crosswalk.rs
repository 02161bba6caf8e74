//! Crosswalk lookup: raw OLDC field identifiers to human-readable labels.

use std::collections::HashMap;

/// One crosswalk row: a raw field identifier, its display label, and the
/// reporting group it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CrosswalkEntry {
    /// Raw identifier as exported ("Meta Name Description").
    pub raw_name: String,
    /// Human-readable label for output sheets.
    pub label: String,
    /// Reporting group (e.g. "Service Outcome"); empty when absent.
    pub group: String,
}

/// All entries of one crosswalk tab, indexed case-insensitively by raw name.
#[derive(Debug, Clone, Default)]
pub struct Crosswalk {
    entries: Vec<CrosswalkEntry>,
    by_raw: HashMap<String, usize>,
}

impl Crosswalk {
    pub fn new(entries: Vec<CrosswalkEntry>) -> Self {
        let mut by_raw = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            // First entry wins; later spellings of the same raw name are
            // shadowed rather than merged.
            by_raw
                .entry(entry.raw_name.to_uppercase())
                .or_insert(idx);
        }
        Self { entries, by_raw }
    }

    pub fn entries(&self) -> &[CrosswalkEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the label for a raw identifier, case-insensitively.
    pub fn label_for(&self, raw_name: &str) -> Option<&str> {
        self.by_raw
            .get(&raw_name.to_uppercase())
            .map(|&idx| self.entries[idx].label.as_str())
    }

    /// Raw identifiers belonging to a reporting group.
    pub fn raw_names_in_group(&self, group: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.group.eq_ignore_ascii_case(group))
            .map(|entry| entry.raw_name.as_str())
            .collect()
    }
}
