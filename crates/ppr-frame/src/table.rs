use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::error::{FrameError, Result};
use crate::value::Value;

/// Which duplicate to keep when deduplicating by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keep {
    First,
    Last,
}

/// An ordered, uniquely named set of columns over rows of [`Value`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// Borrowed view of one row, addressable by column name.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> RowRef<'a> {
    pub fn get(&self, column: &str) -> &'a Value {
        static NULL: Value = Value::Null;
        match self.columns.iter().position(|name| name == column) {
            Some(idx) => &self.values[idx],
            None => &NULL,
        }
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }
}

impl Table {
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.clone()) {
                return Err(FrameError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> RowRef<'_> {
        RowRef {
            columns: &self.columns,
            values: &self.rows[index],
        }
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(|values| RowRef {
            columns: &self.columns,
            values,
        })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub(crate) fn require(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| FrameError::ColumnNotFound(name.to_string()))
    }

    pub fn value(&self, row: usize, column: &str) -> Result<&Value> {
        let idx = self.require(column)?;
        Ok(&self.rows[row][idx])
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(FrameError::RowArity {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn column_values(&self, name: &str) -> Result<Vec<Value>> {
        let idx = self.require(name)?;
        Ok(self.rows.iter().map(|row| row[idx].clone()).collect())
    }

    /// Distinct values of a column in first-seen order.
    pub fn unique_values(&self, name: &str) -> Result<Vec<Value>> {
        let idx = self.require(name)?;
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        for row in &self.rows {
            let key = row[idx].group_key();
            if seen.insert(key) {
                values.push(row[idx].clone());
            }
        }
        Ok(values)
    }

    /// Keep the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Self> {
        let indices: Vec<usize> = names
            .iter()
            .map(|name| self.require(name))
            .collect::<Result<_>>()?;
        let columns: Vec<String> = names.iter().map(|name| (*name).to_string()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&idx| row[idx].clone()).collect())
            .collect();
        Self::from_rows(columns, rows)
    }

    /// Drop the named columns; names not present are ignored.
    pub fn drop_columns(&self, names: &[&str]) -> Self {
        let dropped: HashSet<&str> = names.iter().copied().collect();
        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| !dropped.contains(name.as_str()))
            .map(|(idx, _)| idx)
            .collect();
        let columns = keep.iter().map(|&idx| self.columns[idx].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| keep.iter().map(|&idx| row[idx].clone()).collect())
            .collect();
        Self { columns, rows }
    }

    /// Rename columns according to `(from, to)` pairs (exact match).
    ///
    /// When a rename collides with an existing column name, the later column
    /// wins and the earlier one is dropped. That mirrors the source's
    /// crosswalk policy; a warning names the loser so collisions are at
    /// least visible.
    pub fn rename(&self, renames: &[(String, String)]) -> Self {
        let map: HashMap<&str, &str> = renames
            .iter()
            .map(|(from, to)| (from.as_str(), to.as_str()))
            .collect();
        let new_names: Vec<String> = self
            .columns
            .iter()
            .map(|name| {
                map.get(name.as_str())
                    .map_or_else(|| name.clone(), |to| (*to).to_string())
            })
            .collect();
        // Keep the last occurrence of each resulting name.
        let mut last_index: HashMap<&str, usize> = HashMap::new();
        for (idx, name) in new_names.iter().enumerate() {
            last_index.insert(name.as_str(), idx);
        }
        let mut keep = Vec::new();
        for (idx, name) in new_names.iter().enumerate() {
            if last_index[name.as_str()] == idx {
                keep.push(idx);
            } else {
                warn!(
                    column = %self.columns[idx],
                    label = %name,
                    "rename collision: a later column overwrites this one"
                );
            }
        }
        let columns = keep.iter().map(|&idx| new_names[idx].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| keep.iter().map(|&idx| row[idx].clone()).collect())
            .collect();
        Self { columns, rows }
    }

    pub fn rename_one(&self, from: &str, to: &str) -> Self {
        self.rename(&[(from.to_string(), to.to_string())])
    }

    /// Replace an existing column or append a new one.
    pub fn with_column(&self, name: &str, values: Vec<Value>) -> Result<Self> {
        if values.len() != self.height() {
            return Err(FrameError::LengthMismatch {
                expected: self.height(),
                found: values.len(),
            });
        }
        let mut table = self.clone();
        match table.column_index(name) {
            Some(idx) => {
                for (row, value) in table.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                table.columns.push(name.to_string());
                for (row, value) in table.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(table)
    }

    /// Map a column's values in place (missing column is a no-op).
    pub fn map_column(&self, name: &str, f: impl Fn(&Value) -> Value) -> Self {
        let Some(idx) = self.column_index(name) else {
            return self.clone();
        };
        let mut table = self.clone();
        for row in &mut table.rows {
            row[idx] = f(&row[idx]);
        }
        table
    }

    pub fn filter(&self, predicate: impl Fn(RowRef<'_>) -> bool) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|values| {
                predicate(RowRef {
                    columns: &self.columns,
                    values: values.as_slice(),
                })
            })
            .cloned()
            .collect();
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Stable sort by the named key columns.
    pub fn sort_by(&self, keys: &[&str]) -> Result<Self> {
        let indices: Vec<usize> = keys
            .iter()
            .map(|name| self.require(name))
            .collect::<Result<_>>()?;
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| {
            for &idx in &indices {
                let ordering = a[idx].compare(&b[idx]);
                if ordering != std::cmp::Ordering::Equal {
                    return ordering;
                }
            }
            std::cmp::Ordering::Equal
        });
        Ok(Self {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Stack another table underneath, aligning columns by name. Columns
    /// missing on either side fill with null, the way the source's concat
    /// aligned frames.
    pub fn vstack(&self, other: &Self) -> Self {
        let mut columns = self.columns.clone();
        for name in &other.columns {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
        let mut rows = Vec::with_capacity(self.height() + other.height());
        for source in [self, other] {
            let mapping: Vec<Option<usize>> = columns
                .iter()
                .map(|name| source.column_index(name))
                .collect();
            for row in &source.rows {
                rows.push(
                    mapping
                        .iter()
                        .map(|idx| idx.map_or(Value::Null, |idx| row[idx].clone()))
                        .collect(),
                );
            }
        }
        Self { columns, rows }
    }

    /// Drop duplicate rows by key columns, keeping the first or last
    /// occurrence; surviving rows retain their original order.
    pub fn dedupe_by(&self, keys: &[&str], keep: Keep) -> Result<Self> {
        let indices: Vec<usize> = keys
            .iter()
            .map(|name| self.require(name))
            .collect::<Result<_>>()?;
        let key_of = |row: &[Value]| -> String {
            let mut key = String::new();
            for &idx in &indices {
                key.push_str(&row[idx].group_key());
                key.push('\u{1f}');
            }
            key
        };
        let mut chosen: HashMap<String, usize> = HashMap::new();
        for (idx, row) in self.rows.iter().enumerate() {
            let key = key_of(row);
            match keep {
                Keep::First => {
                    chosen.entry(key).or_insert(idx);
                }
                Keep::Last => {
                    chosen.insert(key, idx);
                }
            }
        }
        let rows = self
            .rows
            .iter()
            .enumerate()
            .filter(|(idx, row)| chosen.get(&key_of(row.as_slice())) == Some(idx))
            .map(|(_, row)| row.clone())
            .collect();
        Ok(Self {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Composite group key over the named columns for one row.
    pub(crate) fn composite_key(&self, row: &[Value], indices: &[usize]) -> String {
        let mut key = String::new();
        for &idx in indices {
            key.push_str(&row[idx].group_key());
            key.push('\u{1f}');
        }
        key
    }

    pub(crate) fn key_indices(&self, keys: &[&str]) -> Result<Vec<usize>> {
        keys.iter().map(|name| self.require(name)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            ["State", "Year"],
            vec![
                vec![Value::from("AK"), Value::Int(2023)],
                vec![Value::from("AL"), Value::Int(2024)],
                vec![Value::from("AK"), Value::Int(2024)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        assert!(matches!(
            Table::new(["A", "A"]),
            Err(FrameError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn vstack_aligns_columns_by_name() {
        let left = sample();
        let right = Table::from_rows(
            ["Year", "Program Abbr"],
            vec![vec![Value::Int(2022), Value::from("Core FVPSA")]],
        )
        .unwrap();
        let stacked = left.vstack(&right);
        assert_eq!(stacked.columns(), &["State", "Year", "Program Abbr"]);
        assert_eq!(stacked.height(), 4);
        assert!(stacked.value(3, "State").unwrap().is_null());
        assert_eq!(
            stacked.value(3, "Program Abbr").unwrap(),
            &Value::from("Core FVPSA")
        );
    }

    #[test]
    fn rename_collision_keeps_later_column() {
        let table = Table::from_rows(
            ["A", "B"],
            vec![vec![Value::Int(1), Value::Int(2)]],
        )
        .unwrap();
        let renamed = table.rename(&[("B".to_string(), "A".to_string())]);
        assert_eq!(renamed.columns(), &["A"]);
        assert_eq!(renamed.value(0, "A").unwrap(), &Value::Int(2));
    }

    #[test]
    fn dedupe_keep_last_prefers_later_rows() {
        let table = sample();
        let deduped = table.dedupe_by(&["State"], Keep::Last).unwrap();
        assert_eq!(deduped.height(), 2);
        assert_eq!(deduped.value(0, "Year").unwrap(), &Value::Int(2024));
    }
}
