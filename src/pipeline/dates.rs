use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use tracing::info;

use crate::table::{Table, Value};

use super::StageOutcome;

/// Fallback parse formats tried after the configured display format.
const DATETIME_FORMATS: [&str; 5] = [
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%Y-%m-%d"];

/// Normalize date-like columns into timezone-aware instants.
///
/// When no column list is given, columns are detected by the case-insensitive
/// substrings "data" or "date" in their name; multi-source column names are
/// not fully known ahead of time, so detection stays name-based on purpose.
/// The canonical `timestamp` column is always included. Unparsable cells
/// become null and are counted into a per-column warning; a bad cell never
/// aborts the run.
pub fn normalize_dates(
    mut table: Table,
    timezone: Tz,
    date_format: &str,
    date_columns: Option<&[String]>,
) -> StageOutcome {
    let targets: Vec<String> = match date_columns {
        Some(requested) => requested
            .iter()
            .filter(|name| table.has_column(name))
            .cloned()
            .collect(),
        None => table
            .columns()
            .iter()
            .filter(|name| {
                let lower = name.to_lowercase();
                lower.contains("data")
                    || lower.contains("date")
                    || lower == crate::constants::TIMESTAMP_COLUMN
            })
            .cloned()
            .collect(),
    };

    let mut warnings = Vec::new();
    for name in targets {
        let idx = table.column_index(&name).expect("detected from this table");
        let mut coerced = 0usize;
        table.map_column(idx, |value| {
            if value.is_null() {
                return Value::Null;
            }
            match parse_timestamp(value, timezone, date_format) {
                Some(instant) => Value::Timestamp(instant),
                None => {
                    coerced += 1;
                    Value::Null
                }
            }
        });
        if coerced > 0 {
            warnings.push(format!(
                "column '{}': {} value(s) could not be parsed as dates",
                name, coerced
            ));
        }
        info!("column '{}' normalized to timezone {}", name, timezone);
    }

    StageOutcome::with_warnings(table, warnings)
}

/// Parse one cell into an instant in the target zone. Aware inputs are
/// converted; naive ones localized. Anything else is unparsable.
fn parse_timestamp(value: &Value, timezone: Tz, date_format: &str) -> Option<DateTime<Tz>> {
    match value {
        Value::Timestamp(instant) => Some(instant.with_timezone(&timezone)),
        Value::Text(raw) => parse_text(raw.trim(), timezone, date_format),
        _ => None,
    }
}

fn parse_text(raw: &str, timezone: Tz, date_format: &str) -> Option<DateTime<Tz>> {
    if raw.is_empty() {
        return None;
    }

    if let Ok(aware) = DateTime::parse_from_rfc3339(raw) {
        return Some(aware.with_timezone(&timezone));
    }

    for format in std::iter::once(date_format).chain(DATETIME_FORMATS) {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return localize(naive, timezone);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(day) = NaiveDate::parse_from_str(raw, format) {
            return localize(day.and_time(NaiveTime::MIN), timezone);
        }
    }
    None
}

/// A naive timestamp inside a DST gap has no valid localization and is
/// treated like any other unparsable value.
fn localize(naive: NaiveDateTime, timezone: Tz) -> Option<DateTime<Tz>> {
    timezone.from_local_datetime(&naive).earliest()
}
