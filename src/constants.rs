/// Source identifiers and canonical tags used across the pipeline.
/// Mappings and collectors are keyed by source id; merged rows carry the tag.

// Source ids (used in config column mappings and CLI)
pub const SPREADSHEET_SOURCE: &str = "fonte1";
pub const API_SOURCE: &str = "fonte2";

// Provenance tags written into the `source` column of the unified table
pub const SPREADSHEET_TAG: &str = "Fonte 1";
pub const API_TAG: &str = "Fonte 2";

// Canonical column names
pub const SOURCE_COLUMN: &str = "source";
pub const STATUS_COLUMN: &str = "status";
pub const TIMESTAMP_COLUMN: &str = "timestamp";

// Processing defaults
pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y %H:%M";
