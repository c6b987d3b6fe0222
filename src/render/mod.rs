use std::fs;
use std::path::PathBuf;

use askama::Template;
use chrono::Utc;
use chrono_tz::Tz;
use tracing::info;

use crate::config::{ProcessingConfig, RenderConfig};
use crate::error::Result;
use crate::table::{format_number, Table, Value};

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    title: &'a str,
    generated_at: String,
    columns: &'a [String],
    rows: Vec<Vec<String>>,
}

/// Renders the post-projection unified table to a standalone HTML artifact.
///
/// Serialization-for-display lives here and nowhere upstream: nulls become
/// `"-"`, timestamps take the configured display format, everything else is
/// stringified.
pub struct HtmlRenderer {
    title: String,
    output_dir: PathBuf,
    date_format: String,
    timezone: Tz,
}

impl HtmlRenderer {
    pub fn new(report: &RenderConfig, processing: &ProcessingConfig) -> Result<Self> {
        Ok(Self {
            title: report.title.clone(),
            output_dir: PathBuf::from(&report.output_dir),
            date_format: processing.date_format.clone(),
            timezone: processing.timezone()?,
        })
    }

    pub fn display_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "-".to_string(),
            Value::Text(text) => text.clone(),
            Value::Number(number) => format_number(*number),
            Value::Bool(flag) => flag.to_string(),
            Value::Timestamp(instant) => instant.format(&self.date_format).to_string(),
        }
    }

    pub fn render_to_string(&self, table: &Table) -> Result<String> {
        let generated_at = Utc::now()
            .with_timezone(&self.timezone)
            .format("%d/%m/%Y %H:%M:%S")
            .to_string();
        let rows = table
            .rows()
            .iter()
            .map(|row| row.iter().map(|value| self.display_value(value)).collect())
            .collect();

        let template = ReportTemplate {
            title: &self.title,
            generated_at,
            columns: table.columns(),
            rows,
        };
        Ok(template.render()?)
    }

    /// Render and write the artifact; returns its path for delivery.
    pub fn render(&self, table: &Table) -> Result<PathBuf> {
        info!("generating HTML with {} records", table.row_count());
        let html = self.render_to_string(table)?;

        fs::create_dir_all(&self.output_dir)?;
        let stamp = Utc::now().with_timezone(&self.timezone).format("%Y%m%d_%H%M%S");
        let path = self.output_dir.join(format!("report_{}.html", stamp));
        fs::write(&path, html)?;
        info!("HTML report written to {}", path.display());
        Ok(path)
    }
}
