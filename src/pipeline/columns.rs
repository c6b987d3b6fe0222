use std::collections::HashMap;

use tracing::info;

use crate::table::Table;

use super::StageOutcome;

/// Rename source-specific column names to their canonical names.
///
/// A missing mapping is a configuration gap, not an error: the table passes
/// through unchanged with a warning. Keys not present in the table are
/// skipped, so applying the same mapping to an already-renamed table is a
/// no-op.
pub fn normalize_columns(
    mut table: Table,
    mapping: Option<&HashMap<String, String>>,
    source_id: &str,
) -> StageOutcome {
    let Some(mapping) = mapping.filter(|m| !m.is_empty()) else {
        return StageOutcome::with_warnings(
            table,
            vec![format!("no column mapping defined for {}", source_id)],
        );
    };

    let renamed = table.rename_columns(mapping);
    if !renamed.is_empty() {
        let renames: Vec<String> = renamed
            .iter()
            .map(|(old, new)| format!("{} -> {}", old, new))
            .collect();
        info!("normalized columns for {}: {}", source_id, renames.join(", "));
    }
    StageOutcome::clean(table)
}

/// Select the requested columns, in the requested order, for presentation.
///
/// Requested columns absent from the table are reported in one warning and
/// skipped; projection proceeds with whatever is available.
pub fn project_columns(table: &Table, requested: &[String]) -> StageOutcome {
    let mut indices = Vec::new();
    let mut missing = Vec::new();
    for name in requested {
        match table.column_index(name) {
            Some(idx) => indices.push(idx),
            None => missing.push(name.clone()),
        }
    }

    let projected = table.select(&indices);
    info!("projected {} of {} columns", indices.len(), table.columns().len());

    let warnings = if missing.is_empty() {
        Vec::new()
    } else {
        vec![format!("columns not found: {}", missing.join(", "))]
    };
    StageOutcome::with_warnings(projected, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;
    use serde_json::json;

    fn mapping() -> HashMap<String, String> {
        let mut m = HashMap::new();
        m.insert("Data".to_string(), "timestamp".to_string());
        m.insert("Status".to_string(), "status".to_string());
        m
    }

    fn sample_table() -> Table {
        Table::from_json_records(&[json!({"Data": "03/02/2026", "Status": "PEND", "Obs": "x"})])
            .unwrap()
    }

    #[test]
    fn renames_mapped_columns_and_keeps_others() {
        let outcome = normalize_columns(sample_table(), Some(&mapping()), "fonte1");
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.table.columns(), &["timestamp", "status", "Obs"]);
    }

    #[test]
    fn missing_mapping_passes_through_with_warning() {
        let table = sample_table();
        let outcome = normalize_columns(table.clone(), None, "fonte3");
        assert_eq!(outcome.table, table);
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn normalization_is_idempotent() {
        let mapping = mapping();
        let once = normalize_columns(sample_table(), Some(&mapping), "fonte1").table;
        let twice = normalize_columns(once.clone(), Some(&mapping), "fonte1").table;
        assert_eq!(once, twice);
    }

    #[test]
    fn projection_keeps_requested_order_and_warns_on_missing() {
        let table = sample_table();
        let requested = vec!["Status".to_string(), "Data".to_string(), "nope".to_string()];
        let outcome = project_columns(&table, &requested);
        assert_eq!(outcome.table.columns(), &["Status", "Data"]);
        assert_eq!(outcome.table.rows()[0][0], Value::Text("PEND".into()));
        assert!(outcome.warnings[0].contains("nope"));
    }
}
