use chrono::DateTime;
use chrono_tz::Tz;

use crate::error::{ReportError, Result};

/// A single cell of a source record set.
///
/// `Timestamp` only appears after date normalization; collectors produce the
/// other variants and leave date-like cells as text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
    Timestamp(DateTime<Tz>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// String form used for lookups (status translation). Null has none.
    pub fn lookup_key(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Text(s) => Some(s.clone()),
            Value::Number(n) => Some(format_number(*n)),
            Value::Bool(b) => Some(b.to_string()),
            Value::Timestamp(ts) => Some(ts.to_rfc3339()),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(Value::Number)
                .unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::Text(s.clone()),
            // Nested structures are kept as their compact JSON text
            other => Value::Text(other.to_string()),
        }
    }
}

/// Render an f64 without a trailing `.0` when it is integral
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// In-memory rectangular record set: ordered columns, rows of equal width.
///
/// Both collectors produce this shape, so every pipeline stage works on one
/// representation regardless of origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Assemble a table from pre-aligned parts. Callers guarantee every row
    /// matches the column count.
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Build a table from heterogeneous JSON records.
    ///
    /// API pages are not guaranteed a uniform key set, so the column set is
    /// the union of observed keys in first-seen order and absent keys are
    /// padded with null (schema reconciliation happens here, before any stage
    /// assumes a rectangular shape).
    pub fn from_json_records(records: &[serde_json::Value]) -> Result<Self> {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            let obj = record.as_object().ok_or_else(|| {
                ReportError::Table(format!("expected JSON object record, got: {}", record))
            })?;
            for key in obj.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut table = Table::new(columns);
        for record in records {
            let obj = record.as_object().expect("validated above");
            let row = table
                .columns
                .iter()
                .map(|col| obj.get(col).map(Value::from).unwrap_or(Value::Null))
                .collect();
            table.rows.push(row);
        }
        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Append a row; must match the current column count.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ReportError::Table(format!(
                "row width {} does not match {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Set every cell of `name` to `value`, appending the column if absent.
    pub fn set_column(&mut self, name: &str, value: Value) {
        match self.column_index(name) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = value.clone();
                }
            }
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(value.clone());
                }
            }
        }
    }

    /// Rename columns present in the mapping; unmapped columns are untouched.
    /// Applying the same mapping twice is a no-op for already-renamed keys.
    pub fn rename_columns(&mut self, mapping: &std::collections::HashMap<String, String>) -> Vec<(String, String)> {
        let mut renamed = Vec::new();
        for col in &mut self.columns {
            if let Some(new_name) = mapping.get(col) {
                renamed.push((col.clone(), new_name.clone()));
                *col = new_name.clone();
            }
        }
        renamed
    }

    /// Map every value of one column in place.
    pub fn map_column<F: FnMut(&Value) -> Value>(&mut self, index: usize, mut f: F) {
        for row in &mut self.rows {
            row[index] = f(&row[index]);
        }
    }

    /// New table holding the given columns (by index), in the given order.
    pub fn select(&self, indices: &[usize]) -> Table {
        let columns = indices.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Table { columns, rows }
    }

    /// Reorder columns (and every row) to the target layout, padding columns
    /// this table does not have with null.
    pub fn conform_to(&self, target_columns: &[String]) -> Table {
        let indices: Vec<Option<usize>> =
            target_columns.iter().map(|c| self.column_index(c)).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|idx| idx.map(|i| row[i].clone()).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Table { columns: target_columns.to_vec(), rows }
    }
}
