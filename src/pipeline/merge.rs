use tracing::info;

use crate::constants;
use crate::table::{Table, Value};

use super::StageOutcome;

/// Unify both sources into one table.
///
/// Each row is tagged with its origin, the column sets are reconciled to
/// their union (missing columns padded with null), rows are concatenated
/// fonte 1 first, and exact full-row duplicates are dropped keeping the
/// first occurrence. Tagging happens before dedup, so a record present
/// identically in both sources survives twice: the `source` cell differs.
pub fn merge(mut table1: Table, mut table2: Table) -> StageOutcome {
    info!(
        "merging datasets: {} ({} rows) + {} ({} rows)",
        constants::SPREADSHEET_TAG,
        table1.row_count(),
        constants::API_TAG,
        table2.row_count()
    );

    table1.set_column(constants::SOURCE_COLUMN, Value::Text(constants::SPREADSHEET_TAG.into()));
    table2.set_column(constants::SOURCE_COLUMN, Value::Text(constants::API_TAG.into()));

    // Union keeps table1's layout first, then table2's extra columns
    let mut union: Vec<String> = table1.columns().to_vec();
    for column in table2.columns() {
        if !union.contains(column) {
            union.push(column.clone());
        }
    }

    let table1 = table1.conform_to(&union);
    let table2 = table2.conform_to(&union);

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(table1.row_count() + table2.row_count());
    let mut duplicates = 0usize;
    for row in table1.rows().iter().chain(table2.rows().iter()) {
        if rows.contains(row) {
            duplicates += 1;
        } else {
            rows.push(row.clone());
        }
    }

    if duplicates > 0 {
        info!("dropped {} exact duplicate row(s)", duplicates);
    }
    let merged = Table::from_parts(union, rows);
    info!("datasets unified: {} total rows", merged.row_count());
    StageOutcome::clean(merged)
}
