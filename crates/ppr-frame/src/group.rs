//! Grouped reductions and group-relative row retention.

use std::collections::HashMap;

use crate::error::Result;
use crate::table::Table;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extreme {
    Max,
    Min,
}

impl Table {
    /// Keep the rows holding the group maximum of `column` within each
    /// group of `keys`. Null values never win; a group whose values are all
    /// null keeps every row.
    pub fn retain_group_max(&self, keys: &[&str], column: &str) -> Result<Self> {
        self.retain_group_extreme(keys, column, Extreme::Max)
    }

    /// Keep the rows holding the group minimum of `column`, with the same
    /// null policy as [`Table::retain_group_max`].
    pub fn retain_group_min(&self, keys: &[&str], column: &str) -> Result<Self> {
        self.retain_group_extreme(keys, column, Extreme::Min)
    }

    fn retain_group_extreme(&self, keys: &[&str], column: &str, extreme: Extreme) -> Result<Self> {
        let key_idx = self.key_indices(keys)?;
        let col_idx = self.require(column)?;

        let mut best: HashMap<String, Value> = HashMap::new();
        for row in self.rows() {
            let value = &row[col_idx];
            if value.is_null() {
                continue;
            }
            let key = self.composite_key(row, &key_idx);
            best.entry(key)
                .and_modify(|current| {
                    let replace = match extreme {
                        Extreme::Max => value.compare(current) == std::cmp::Ordering::Greater,
                        Extreme::Min => value.compare(current) == std::cmp::Ordering::Less,
                    };
                    if replace {
                        *current = value.clone();
                    }
                })
                .or_insert_with(|| value.clone());
        }

        Ok(self.filter(|row| {
            let values = row.values();
            let key = self.composite_key(values, &key_idx);
            match best.get(&key) {
                Some(winner) => values[col_idx].compare(winner) == std::cmp::Ordering::Equal,
                // All-null group: nothing to narrow on.
                None => true,
            }
        }))
    }

    /// Group by `keys` and sum `column` (nulls and non-numerics ignored;
    /// an empty group sums to zero). One output row per group, first-seen
    /// order, key columns followed by `out_column`.
    pub fn group_sum(&self, keys: &[&str], column: &str, out_column: &str) -> Result<Self> {
        let key_idx = self.key_indices(keys)?;
        let col_idx = self.require(column)?;

        let mut order: Vec<String> = Vec::new();
        let mut sums: HashMap<String, (Vec<Value>, f64)> = HashMap::new();
        for row in self.rows() {
            let key = self.composite_key(row, &key_idx);
            let entry = sums.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                let key_values = key_idx.iter().map(|&idx| row[idx].clone()).collect();
                (key_values, 0.0)
            });
            if let Some(value) = row[col_idx].as_f64() {
                entry.1 += value;
            }
        }

        let mut columns: Vec<String> = keys.iter().map(|name| (*name).to_string()).collect();
        columns.push(out_column.to_string());
        let mut rows = Vec::with_capacity(order.len());
        for key in order {
            let (mut values, sum) = sums.remove(&key).unwrap_or_default();
            values.push(Value::Num(sum));
            rows.push(values);
        }
        Self::from_rows(columns, rows)
    }

    /// Group by `keys`, taking the first non-null value of `column` per
    /// group. One output row per group in first-seen order.
    pub fn group_first(&self, keys: &[&str], column: &str) -> Result<Self> {
        let key_idx = self.key_indices(keys)?;
        let col_idx = self.require(column)?;

        let mut order: Vec<String> = Vec::new();
        let mut firsts: HashMap<String, (Vec<Value>, Value)> = HashMap::new();
        for row in self.rows() {
            let key = self.composite_key(row, &key_idx);
            match firsts.get_mut(&key) {
                Some((_, current)) => {
                    if current.is_null() && !row[col_idx].is_null() {
                        *current = row[col_idx].clone();
                    }
                }
                None => {
                    order.push(key.clone());
                    let key_values = key_idx.iter().map(|&idx| row[idx].clone()).collect();
                    firsts.insert(key, (key_values, row[col_idx].clone()));
                }
            }
        }

        let mut columns: Vec<String> = keys.iter().map(|name| (*name).to_string()).collect();
        columns.push(column.to_string());
        let mut rows = Vec::with_capacity(order.len());
        for key in order {
            let (mut values, first) = firsts.remove(&key).expect("group recorded");
            values.push(first);
            rows.push(values);
        }
        Self::from_rows(columns, rows)
    }

    /// Count rows per group of `keys`; one output row per group in
    /// first-seen order, key columns followed by `out_column`.
    pub fn group_count(&self, keys: &[&str], out_column: &str) -> Result<Self> {
        let key_idx = self.key_indices(keys)?;

        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, (Vec<Value>, i64)> = HashMap::new();
        for row in self.rows() {
            let key = self.composite_key(row, &key_idx);
            let entry = counts.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                let key_values = key_idx.iter().map(|&idx| row[idx].clone()).collect();
                (key_values, 0)
            });
            entry.1 += 1;
        }

        let mut columns: Vec<String> = keys.iter().map(|name| (*name).to_string()).collect();
        columns.push(out_column.to_string());
        let mut rows = Vec::with_capacity(order.len());
        for key in order {
            let (mut values, count) = counts.remove(&key).expect("group recorded");
            values.push(Value::Int(count));
            rows.push(values);
        }
        Self::from_rows(columns, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn revisions() -> Table {
        Table::from_rows(
            ["EIN", "Rev"],
            vec![
                vec![Value::from("E1"), Value::Int(1)],
                vec![Value::from("E1"), Value::Int(2)],
                vec![Value::from("E2"), Value::Int(1)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn retain_group_max_keeps_highest_revision() {
        let kept = revisions().retain_group_max(&["EIN"], "Rev").unwrap();
        assert_eq!(kept.height(), 2);
        assert_eq!(kept.value(0, "Rev").unwrap(), &Value::Int(2));
        assert_eq!(kept.value(1, "Rev").unwrap(), &Value::Int(1));
    }

    #[test]
    fn all_null_group_keeps_every_row() {
        let table = Table::from_rows(
            ["EIN", "Rev"],
            vec![
                vec![Value::from("E1"), Value::Null],
                vec![Value::from("E1"), Value::Null],
            ],
        )
        .unwrap();
        let kept = table.retain_group_max(&["EIN"], "Rev").unwrap();
        assert_eq!(kept.height(), 2);
    }

    #[test]
    fn group_sum_ignores_nulls() {
        let table = Table::from_rows(
            ["State", "Amount"],
            vec![
                vec![Value::from("AK"), Value::Num(10.0)],
                vec![Value::from("AK"), Value::Null],
                vec![Value::from("AK"), Value::Num(5.0)],
            ],
        )
        .unwrap();
        let sums = table.group_sum(&["State"], "Amount", "Total").unwrap();
        assert_eq!(sums.height(), 1);
        assert_eq!(sums.value(0, "Total").unwrap(), &Value::Num(15.0));
    }
}
