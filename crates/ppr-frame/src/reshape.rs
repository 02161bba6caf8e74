//! Wide/long reshaping: melt, pivot, and row explosion.

use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::table::Table;
use crate::value::Value;

impl Table {
    /// Melt `value_vars` into (attribute, value) pairs keyed by `id_vars`.
    /// One output row per input row and value column, in column order.
    pub fn melt(
        &self,
        id_vars: &[&str],
        value_vars: &[&str],
        var_name: &str,
        value_name: &str,
    ) -> Result<Self> {
        let id_idx = self.key_indices(id_vars)?;
        let value_idx = self.key_indices(value_vars)?;

        let mut columns: Vec<String> = id_vars.iter().map(|name| (*name).to_string()).collect();
        columns.push(var_name.to_string());
        columns.push(value_name.to_string());

        let mut rows = Vec::with_capacity(self.height() * value_vars.len());
        for &col in &value_idx {
            for row in self.rows() {
                let mut out: Vec<Value> = id_idx.iter().map(|&idx| row[idx].clone()).collect();
                out.push(Value::Str(self.columns()[col].clone()));
                out.push(row[col].clone());
                rows.push(out);
            }
        }
        Self::from_rows(columns, rows)
    }

    /// Melt every column not named in `id_vars`.
    pub fn melt_all(&self, id_vars: &[&str], var_name: &str, value_name: &str) -> Result<Self> {
        let value_vars: Vec<&str> = self
            .columns()
            .iter()
            .map(String::as_str)
            .filter(|name| !id_vars.contains(name))
            .collect();
        self.melt(id_vars, &value_vars, var_name, value_name)
    }

    /// Pivot long data back to wide: one row per distinct `index` key, one
    /// column per distinct value of `column_field`, cells from
    /// `value_field`. Later duplicates of an (index, label) pair overwrite
    /// earlier ones.
    pub fn pivot(&self, index: &[&str], column_field: &str, value_field: &str) -> Result<Self> {
        let index_idx = self.key_indices(index)?;
        let label_idx = self.require(column_field)?;
        let value_idx = self.require(value_field)?;

        let mut labels: Vec<String> = Vec::new();
        let mut label_pos: HashMap<String, usize> = HashMap::new();
        for row in self.rows() {
            let label = row[label_idx].text();
            if label.is_empty() {
                continue;
            }
            if !label_pos.contains_key(&label) {
                label_pos.insert(label.clone(), labels.len());
                labels.push(label);
            }
        }

        let mut order: Vec<String> = Vec::new();
        let mut cells: HashMap<String, (Vec<Value>, Vec<Value>)> = HashMap::new();
        for row in self.rows() {
            let key = self.composite_key(row, &index_idx);
            let entry = cells.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                let key_values = index_idx.iter().map(|&idx| row[idx].clone()).collect();
                (key_values, vec![Value::Null; labels.len()])
            });
            let label = row[label_idx].text();
            if let Some(&pos) = label_pos.get(&label) {
                if !entry.1[pos].is_null() {
                    debug!(label = %label, "pivot overwrite: duplicate cell for index key");
                }
                entry.1[pos] = row[value_idx].clone();
            }
        }

        let mut columns: Vec<String> = index.iter().map(|name| (*name).to_string()).collect();
        columns.extend(labels.iter().cloned());
        let mut rows = Vec::with_capacity(order.len());
        for key in order {
            let (mut values, data) = cells.remove(&key).expect("index key recorded");
            values.extend(data);
            rows.push(values);
        }
        Self::from_rows(columns, rows)
    }

    /// Explode one column into multiple rows. `split` maps each cell to the
    /// values it expands into; an empty expansion keeps a single null row so
    /// identifiers are never lost.
    pub fn explode_with(
        &self,
        column: &str,
        split: impl Fn(&Value) -> Vec<Value>,
    ) -> Result<Self> {
        let col_idx = self.require(column)?;
        let mut rows = Vec::with_capacity(self.height());
        for row in self.rows() {
            let parts = split(&row[col_idx]);
            if parts.is_empty() {
                let mut out = row.clone();
                out[col_idx] = Value::Null;
                rows.push(out);
                continue;
            }
            for part in parts {
                let mut out = row.clone();
                out[col_idx] = part;
                rows.push(out);
            }
        }
        Self::from_rows(self.columns().to_vec(), rows)
    }
}
