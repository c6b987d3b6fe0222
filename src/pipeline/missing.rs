use tracing::info;

use crate::table::{Table, Value};

use super::StageOutcome;

#[derive(Debug, PartialEq)]
enum ColumnKind {
    /// Only text values (or no values at all, matching the original's
    /// object-dtype behavior for fully-null columns)
    Text,
    Numeric,
    /// Timestamps, bools, or mixed content; nulls here stay nulls
    Other,
}

/// Fill missing values with type-appropriate defaults: empty string for text
/// columns, zero for numeric columns. One blanket pass over the merged table;
/// columns of any other kind are deliberately left untouched.
pub fn sanitize_nulls(mut table: Table) -> StageOutcome {
    let mut filled = 0usize;
    for idx in 0..table.columns().len() {
        let replacement = match classify(&table, idx) {
            ColumnKind::Text => Value::Text(String::new()),
            ColumnKind::Numeric => Value::Number(0.0),
            ColumnKind::Other => continue,
        };
        table.map_column(idx, |value| {
            if value.is_null() {
                filled += 1;
                replacement.clone()
            } else {
                value.clone()
            }
        });
    }

    if filled > 0 {
        info!("filled {} missing value(s)", filled);
    }
    StageOutcome::clean(table)
}

fn classify(table: &Table, idx: usize) -> ColumnKind {
    let mut saw_text = false;
    let mut saw_number = false;
    for row in table.rows() {
        match row[idx] {
            Value::Null => {}
            Value::Text(_) => saw_text = true,
            Value::Number(_) => saw_number = true,
            _ => return ColumnKind::Other,
        }
    }
    match (saw_text, saw_number) {
        (true, true) => ColumnKind::Other,
        (false, true) => ColumnKind::Numeric,
        // all-text, or no non-null values at all
        _ => ColumnKind::Text,
    }
}
