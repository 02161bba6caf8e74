//! Hash joins between tables.
//!
//! Join keys match on canonical value keys (see [`Value::group_key`]), so a
//! year stored as an integer on one side joins a year stored as an integral
//! float on the other, and null keys match null keys. Non-key columns whose
//! names clash across the two sides are suffixed `_x` / `_y`.

use std::collections::HashMap;

use crate::error::Result;
use crate::table::Table;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Only matching rows.
    Inner,
    /// Every left row; unmatched left rows null-fill the right columns.
    Left,
    /// Every right row; unmatched right rows null-fill the left columns.
    Right,
    /// Every match plus the unmatched rows of both sides.
    Outer,
}

impl Table {
    /// Join on same-named key columns.
    pub fn join(&self, other: &Self, keys: &[&str], kind: JoinKind) -> Result<Self> {
        self.join_on(other, keys, keys, kind)
    }

    /// Join with distinct key column names per side. Key columns with equal
    /// names collapse into one output column; differently named key pairs
    /// are both kept.
    pub fn join_on(
        &self,
        other: &Self,
        left_keys: &[&str],
        right_keys: &[&str],
        kind: JoinKind,
    ) -> Result<Self> {
        let left_idx = self.key_indices(left_keys)?;
        let right_idx = other.key_indices(right_keys)?;

        // Right columns that are merged away (same-named keys).
        let merged_right: Vec<usize> = right_keys
            .iter()
            .zip(&right_idx)
            .filter(|(name, _)| left_keys.contains(name))
            .map(|(_, &idx)| idx)
            .collect();
        let right_kept: Vec<usize> = (0..other.width())
            .filter(|idx| !merged_right.contains(idx))
            .collect();

        let mut columns: Vec<String> = Vec::new();
        for name in self.columns() {
            let clash = right_kept
                .iter()
                .any(|&right| other.columns()[right] == *name);
            if clash {
                columns.push(format!("{name}_x"));
            } else {
                columns.push(name.clone());
            }
        }
        for &idx in &right_kept {
            let name = &other.columns()[idx];
            if self.columns().contains(name) {
                columns.push(format!("{name}_y"));
            } else {
                columns.push(name.clone());
            }
        }

        let mut right_groups: HashMap<String, Vec<usize>> = HashMap::new();
        for (row_idx, row) in other.rows().iter().enumerate() {
            right_groups
                .entry(other.composite_key(row, &right_idx))
                .or_default()
                .push(row_idx);
        }

        let null_left = vec![Value::Null; self.width()];
        let null_right: Vec<Value> = vec![Value::Null; right_kept.len()];
        let combine = |left: &[Value], right_row: Option<&[Value]>| -> Vec<Value> {
            let mut row: Vec<Value> = left.to_vec();
            match right_row {
                Some(values) => row.extend(right_kept.iter().map(|&idx| values[idx].clone())),
                None => row.extend(null_right.iter().cloned()),
            }
            row
        };

        let mut rows: Vec<Vec<Value>> = Vec::new();
        let mut matched_right: Vec<bool> = vec![false; other.height()];
        for row in self.rows() {
            let key = self.composite_key(row, &left_idx);
            match right_groups.get(&key) {
                Some(indices) => {
                    for &right_row in indices {
                        matched_right[right_row] = true;
                        rows.push(combine(row, Some(&other.rows()[right_row])));
                    }
                }
                None => {
                    if matches!(kind, JoinKind::Left | JoinKind::Outer) {
                        rows.push(combine(row, None));
                    }
                }
            }
        }
        if matches!(kind, JoinKind::Right | JoinKind::Outer) {
            for (right_row, seen) in matched_right.iter().enumerate() {
                if *seen {
                    continue;
                }
                let values = &other.rows()[right_row];
                let mut row = combine(&null_left, Some(values));
                // Copy the right-side key values into the left key slots.
                for (pos, &right_key_idx) in right_idx.iter().enumerate() {
                    row[left_idx[pos]] = values[right_key_idx].clone();
                }
                rows.push(row);
            }
        }

        Self::from_rows(columns, rows)
    }
}
