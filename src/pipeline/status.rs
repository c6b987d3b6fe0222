use std::collections::HashMap;

use tracing::info;

use crate::table::{Table, Value};

use super::StageOutcome;

/// Translate raw status codes into display labels.
///
/// Lookup keys are always matched uppercase, so `pending`, `PENDING` and
/// `Pending` all hit the same entry. Values missing from the table keep
/// their original form (identity fallback), and null cells are skipped.
pub fn translate_status(
    mut table: Table,
    translation: &HashMap<String, String>,
    column: &str,
) -> StageOutcome {
    let Some(idx) = table.column_index(column) else {
        return StageOutcome::with_warnings(
            table,
            vec![format!("column '{}' not found for status translation", column)],
        );
    };

    if translation.is_empty() {
        return StageOutcome::clean(table);
    }

    table.map_column(idx, |value| {
        value
            .lookup_key()
            .and_then(|key| translation.get(&key.to_uppercase()))
            .map(|label| Value::Text(label.clone()))
            .unwrap_or_else(|| value.clone())
    });

    info!("status codes translated in column '{}'", column);
    StageOutcome::clean(table)
}
