use std::path::PathBuf;

use async_trait::async_trait;
use calamine::{open_workbook_auto, Data, Reader};
use tracing::info;

use crate::constants;
use crate::error::{ReportError, Result};
use crate::table::{Table, Value};

use super::SourceCollector;

/// Reads the downloaded fonte 1 spreadsheet into a table.
///
/// CSV goes through the `csv` reader; anything else is opened as an Excel
/// workbook (first worksheet, header row first). Column names arrive raw;
/// the pipeline normalizes them later.
pub struct SpreadsheetCollector {
    path: PathBuf,
}

impl SpreadsheetCollector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Table> {
        info!("loading spreadsheet: {}", self.path.display());
        let table = match self.path.extension().and_then(|e| e.to_str()) {
            Some("csv") => self.load_csv()?,
            _ => self.load_workbook()?,
        };
        info!(
            "spreadsheet loaded: {} rows, {} columns",
            table.row_count(),
            table.columns().len()
        );
        Ok(table)
    }

    fn load_csv(&self) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let mut table = Table::new(headers);
        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter().map(parse_csv_cell).collect())?;
        }
        Ok(table)
    }

    fn load_workbook(&self) -> Result<Table> {
        let mut workbook = open_workbook_auto(&self.path)?;
        let range = workbook.worksheet_range_at(0).ok_or_else(|| {
            ReportError::Table(format!("workbook has no sheets: {}", self.path.display()))
        })??;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .ok_or_else(|| {
                ReportError::Table(format!("workbook sheet is empty: {}", self.path.display()))
            })?
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut table = Table::new(headers);
        for row in rows {
            table.push_row(row.iter().map(workbook_cell).collect())?;
        }
        Ok(table)
    }
}

#[async_trait]
impl SourceCollector for SpreadsheetCollector {
    fn source_id(&self) -> &'static str {
        constants::SPREADSHEET_SOURCE
    }

    async fn collect(&self) -> Result<Table> {
        self.load()
    }
}

fn parse_csv_cell(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(number) = raw.parse::<f64>() {
        return Value::Number(number);
    }
    match raw.to_ascii_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::Text(raw.to_string()),
    }
}

fn workbook_cell(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Value::Null
            } else {
                Value::Text(trimmed.to_string())
            }
        }
        Data::Float(f) => Value::Number(*f),
        Data::Int(i) => Value::Number(*i as f64),
        Data::Bool(b) => Value::Bool(*b),
        // Kept as ISO text so the date normalizer localizes it like any
        // other naive date cell
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|naive| Value::Text(naive.format("%Y-%m-%dT%H:%M:%S").to_string()))
            .unwrap_or(Value::Null),
        Data::DateTimeIso(s) => Value::Text(s.clone()),
        Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(_) => Value::Null,
    }
}
