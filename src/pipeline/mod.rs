use std::collections::HashMap;

use chrono_tz::Tz;
use tracing::{info, warn};

use crate::config::ProcessingConfig;
use crate::constants;
use crate::error::Result;
use crate::table::Table;

pub mod columns;
pub mod dates;
pub mod merge;
pub mod missing;
pub mod status;

/// Output of a best-effort stage: the transformed table plus any advisory
/// warnings (missing mapping, missing column, coerced cells). Warnings never
/// abort a run; the orchestrator logs them and carries them on the summary.
#[derive(Debug)]
pub struct StageOutcome {
    pub table: Table,
    pub warnings: Vec<String>,
}

impl StageOutcome {
    pub fn clean(table: Table) -> Self {
        Self { table, warnings: Vec::new() }
    }

    pub fn with_warnings(table: Table, warnings: Vec<String>) -> Self {
        Self { table, warnings }
    }

    /// Log this stage's warnings, move them into the run-level sink, and
    /// hand back the table for the next stage.
    fn log_into(self, sink: &mut Vec<String>) -> Table {
        for warning in &self.warnings {
            warn!("{}", warning);
        }
        sink.extend(self.warnings);
        self.table
    }
}

/// Final result of a pipeline run.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub table: Table,
    pub warnings: Vec<String>,
}

/// Sequences the processing stages over both sources.
///
/// Holds only the read-only processing configuration; every run consumes its
/// input tables by value, so concurrent runs never share mutable state.
pub struct Processor {
    timezone: Tz,
    date_format: String,
    column_mapping: HashMap<String, HashMap<String, String>>,
    status_translation: HashMap<String, String>,
    default_columns: Vec<String>,
}

impl Processor {
    pub fn new(config: &ProcessingConfig) -> Result<Self> {
        Ok(Self {
            timezone: config.timezone()?,
            date_format: config.date_format.clone(),
            column_mapping: config.column_mapping.clone(),
            status_translation: config.status_translation.clone(),
            default_columns: config.columns.clone(),
        })
    }

    pub fn normalize_columns(&self, table: Table, source_id: &str) -> StageOutcome {
        columns::normalize_columns(table, self.column_mapping.get(source_id), source_id)
    }

    pub fn normalize_dates(&self, table: Table, date_columns: Option<&[String]>) -> StageOutcome {
        dates::normalize_dates(table, self.timezone, &self.date_format, date_columns)
    }

    pub fn translate_status(&self, table: Table, column: &str) -> StageOutcome {
        status::translate_status(table, &self.status_translation, column)
    }

    /// Presentation view: configured column subset in configured order.
    pub fn project(&self, table: &Table, requested: Option<&[String]>) -> StageOutcome {
        let requested: Vec<String> = match requested {
            Some(cols) => cols.to_vec(),
            None if !self.default_columns.is_empty() => self.default_columns.clone(),
            None => table.columns().to_vec(),
        };
        columns::project_columns(table, &requested)
    }

    /// Full processing run, all-or-nothing: normalize both sources' columns,
    /// merge, normalize dates, translate status, sanitize nulls.
    pub fn run_full_pipeline(&self, spreadsheet: Table, api: Table) -> Result<PipelineOutcome> {
        info!("=== starting processing pipeline ===");
        let mut warnings = Vec::new();

        let spreadsheet = self
            .normalize_columns(spreadsheet, constants::SPREADSHEET_SOURCE)
            .log_into(&mut warnings);
        let api = self
            .normalize_columns(api, constants::API_SOURCE)
            .log_into(&mut warnings);

        let merged = merge::merge(spreadsheet, api).log_into(&mut warnings);
        let merged = self.normalize_dates(merged, None).log_into(&mut warnings);
        let merged = self
            .translate_status(merged, constants::STATUS_COLUMN)
            .log_into(&mut warnings);
        let merged = missing::sanitize_nulls(merged).log_into(&mut warnings);

        info!("=== pipeline finished: {} final records ===", merged.row_count());
        Ok(PipelineOutcome { table: merged, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;
    use serde_json::json;

    fn test_config() -> ProcessingConfig {
        let mut fonte1 = HashMap::new();
        fonte1.insert("Data".to_string(), "timestamp".to_string());
        fonte1.insert("Status".to_string(), "status".to_string());
        let mut fonte2 = HashMap::new();
        fonte2.insert("state".to_string(), "status".to_string());
        let mut column_mapping = HashMap::new();
        column_mapping.insert("fonte1".to_string(), fonte1);
        column_mapping.insert("fonte2".to_string(), fonte2);

        let mut status_translation = HashMap::new();
        status_translation.insert("PEND".to_string(), "Pendente".to_string());
        status_translation.insert("CRIT".to_string(), "Crítico".to_string());

        ProcessingConfig {
            timezone: "America/Sao_Paulo".to_string(),
            date_format: "%d/%m/%Y %H:%M".to_string(),
            column_mapping,
            status_translation,
            columns: Vec::new(),
        }
    }

    #[test]
    fn pipeline_produces_unified_table() {
        let processor = Processor::new(&test_config()).unwrap();

        let mut spreadsheet = Table::new(vec!["Data".into(), "Status".into()]);
        spreadsheet
            .push_row(vec![Value::Text("03/02/2026 08:00".into()), Value::Text("PEND".into())])
            .unwrap();
        let api = Table::from_json_records(&[
            json!({"timestamp": "2026-02-03T09:00:00Z", "state": "CRIT"}),
        ])
        .unwrap();

        let outcome = processor.run_full_pipeline(spreadsheet, api).unwrap();
        let table = &outcome.table;
        assert_eq!(table.row_count(), 2);

        let status = table.column_index("status").unwrap();
        assert_eq!(table.rows()[0][status], Value::Text("Pendente".into()));
        assert_eq!(table.rows()[1][status], Value::Text("Crítico".into()));

        let source = table.column_index("source").unwrap();
        assert_eq!(table.rows()[0][source], Value::Text("Fonte 1".into()));
        assert_eq!(table.rows()[1][source], Value::Text("Fonte 2".into()));
    }

    #[test]
    fn project_uses_configured_default_columns() {
        let mut config = test_config();
        config.columns = vec!["status".to_string(), "missing".to_string()];
        let processor = Processor::new(&config).unwrap();

        let table = Table::from_json_records(&[json!({"status": "ok", "extra": 1})]).unwrap();
        let outcome = processor.project(&table, None);
        assert_eq!(outcome.table.columns(), &["status"]);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("missing"));
    }

    #[test]
    fn invalid_timezone_is_a_config_error() {
        let mut config = test_config();
        config.timezone = "Mars/Olympus".to_string();
        assert!(Processor::new(&config).is_err());
    }
}
