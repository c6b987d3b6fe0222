use std::collections::HashMap;

use anyhow::Result;
use chrono::TimeZone;
use serde_json::json;

use report_pipeline::config::{ProcessingConfig, RenderConfig};
use report_pipeline::pipeline::Processor;
use report_pipeline::render::HtmlRenderer;
use report_pipeline::table::{Table, Value};

fn processing_config() -> ProcessingConfig {
    let mut fonte1 = HashMap::new();
    fonte1.insert("Data".to_string(), "timestamp".to_string());
    fonte1.insert("Status".to_string(), "status".to_string());
    let mut fonte2 = HashMap::new();
    fonte2.insert("timestamp".to_string(), "timestamp".to_string());
    fonte2.insert("status".to_string(), "status".to_string());
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

fn spreadsheet_table() -> Table {
    let mut table = Table::new(vec!["Data".to_string(), "Status".to_string()]);
    table
        .push_row(vec![
            Value::Text("03/02/2026 08:00".to_string()),
            Value::Text("PEND".to_string()),
        ])
        .unwrap();
    table
}

#[test]
fn end_to_end_unifies_both_sources() -> Result<()> {
    let processor = Processor::new(&processing_config())?;

    let api = Table::from_json_records(&[
        json!({"timestamp": "2026-02-03T09:00:00Z", "status": "CRIT"}),
    ])?;

    let outcome = processor.run_full_pipeline(spreadsheet_table(), api)?;
    let table = &outcome.table;

    assert_eq!(table.row_count(), 2);
    assert_eq!(table.columns(), &["timestamp", "status", "source"]);

    let status = table.column_index("status").unwrap();
    assert_eq!(table.rows()[0][status], Value::Text("Pendente".to_string()));
    assert_eq!(table.rows()[1][status], Value::Text("Crítico".to_string()));

    // both timestamps are aware instants in the configured zone
    let tz = chrono_tz::America::Sao_Paulo;
    let timestamp = table.column_index("timestamp").unwrap();
    assert_eq!(
        table.rows()[0][timestamp],
        Value::Timestamp(tz.with_ymd_and_hms(2026, 2, 3, 8, 0, 0).unwrap())
    );
    assert_eq!(
        table.rows()[1][timestamp],
        Value::Timestamp(tz.with_ymd_and_hms(2026, 2, 3, 6, 0, 0).unwrap())
    );

    let source = table.column_index("source").unwrap();
    assert_eq!(table.rows()[0][source], Value::Text("Fonte 1".to_string()));
    assert_eq!(table.rows()[1][source], Value::Text("Fonte 2".to_string()));

    Ok(())
}

#[test]
fn identical_records_in_both_sources_are_kept_apart() -> Result<()> {
    let processor = Processor::new(&processing_config())?;

    // same content on both sides; within fonte 2 the row repeats
    let spreadsheet = Table::from_json_records(&[json!({"status": "PEND"})])?;
    let api = Table::from_json_records(&[
        json!({"status": "PEND"}),
        json!({"status": "PEND"}),
    ])?;

    let outcome = processor.run_full_pipeline(spreadsheet, api)?;

    // the within-source duplicate collapses; the cross-source twin survives
    // because its source tag differs
    assert_eq!(outcome.table.row_count(), 2);
    let source = outcome.table.column_index("source").unwrap();
    let tags: Vec<&Value> = outcome.table.rows().iter().map(|row| &row[source]).collect();
    assert_eq!(tags[0], &Value::Text("Fonte 1".to_string()));
    assert_eq!(tags[1], &Value::Text("Fonte 2".to_string()));

    Ok(())
}

#[test]
fn sanitized_output_has_no_nulls_in_text_or_numeric_columns() -> Result<()> {
    let processor = Processor::new(&processing_config())?;

    let spreadsheet = Table::from_json_records(&[json!({"Status": "PEND"})])?;
    let api = Table::from_json_records(&[
        json!({"status": "CRIT", "description": "API outage", "severity": 3}),
    ])?;

    let outcome = processor.run_full_pipeline(spreadsheet, api)?;
    let table = &outcome.table;

    let description = table.column_index("description").unwrap();
    let severity = table.column_index("severity").unwrap();
    // the spreadsheet row was padded with nulls during merge; sanitize
    // filled them with the type defaults
    assert_eq!(table.rows()[0][description], Value::Text("".to_string()));
    assert_eq!(table.rows()[0][severity], Value::Number(0.0));

    Ok(())
}

#[test]
fn malformed_dates_warn_and_render_as_dash() -> Result<()> {
    let mut config = processing_config();
    config.columns = vec!["timestamp".to_string(), "status".to_string(), "source".to_string()];
    let processor = Processor::new(&config)?;

    let mut spreadsheet = spreadsheet_table();
    spreadsheet
        .push_row(vec![
            Value::Text("not a date".to_string()),
            Value::Text("CRIT".to_string()),
        ])
        .unwrap();
    let api = Table::from_json_records(&[
        json!({"timestamp": "2026-02-03T09:00:00Z", "status": "CRIT"}),
    ])?;

    let outcome = processor.run_full_pipeline(spreadsheet, api)?;
    assert!(outcome
        .warnings
        .iter()
        .any(|warning| warning.contains("timestamp")));

    let projection = processor.project(&outcome.table, None);
    assert!(projection.warnings.is_empty());

    let dir = tempfile::tempdir()?;
    let report = RenderConfig {
        title: "Relatório de Dados".to_string(),
        output_dir: dir.path().to_str().unwrap().to_string(),
    };
    let renderer = HtmlRenderer::new(&report, &config)?;
    let artifact = renderer.render(&projection.table)?;

    let html = std::fs::read_to_string(artifact)?;
    // the unparsable date cell survived as null and renders as a dash
    assert!(html.contains("<td>-</td>"));
    assert!(html.contains("<td>03/02/2026 08:00</td>"));
    assert!(html.contains("<td>Crítico</td>"));

    Ok(())
}
