use serde::Deserialize;
use std::collections::HashMap;
use std::fs;

use chrono_tz::Tz;

use crate::constants;
use crate::error::{ReportError, Result};

/// Static settings loaded once before any pipeline run, immutable after.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub fonte1: SpreadsheetConfig,
    pub fonte2: ApiConfig,
    #[serde(default)]
    pub report: RenderConfig,
    pub whatsapp: Option<WhatsAppConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProcessingConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Source-specific column name -> canonical name, keyed by source id
    #[serde(default)]
    pub column_mapping: HashMap<String, HashMap<String, String>>,
    /// Uppercase status code -> display label
    #[serde(default)]
    pub status_translation: HashMap<String, String>,
    /// Default projection for presentation; empty means all columns
    #[serde(default)]
    pub columns: Vec<String>,
}

impl ProcessingConfig {
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone.parse().map_err(|e| {
            ReportError::Config(format!("invalid timezone '{}': {}", self.timezone, e))
        })
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SpreadsheetConfig {
    /// Path of the downloaded spreadsheet; may be overridden on the CLI
    pub file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub auth_type: AuthType,
    pub token: Option<String>,
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
    pub api_key_value: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    #[default]
    Bearer,
    ApiKey,
    Basic,
    None,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaginationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_page_param")]
    pub page_param: String,
    #[serde(default = "default_per_page_param")]
    pub per_page_param: String,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            page_param: default_page_param(),
            per_page_param: default_per_page_param(),
            per_page: default_per_page(),
            max_pages: default_max_pages(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { title: default_title(), output_dir: default_output_dir() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WhatsAppConfig {
    pub webhook_url: String,
    pub recipient: String,
    /// Caption template; `{timestamp}` is replaced at send time
    #[serde(default = "default_caption")]
    pub caption: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ReportError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

fn default_timezone() -> String {
    constants::DEFAULT_TIMEZONE.to_string()
}

fn default_date_format() -> String {
    constants::DEFAULT_DATE_FORMAT.to_string()
}

fn default_endpoint() -> String {
    "/dados".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_api_key_header() -> String {
    "X-API-Key".to_string()
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_per_page_param() -> String {
    "per_page".to_string()
}

fn default_per_page() -> usize {
    100
}

fn default_max_pages() -> usize {
    10
}

fn default_title() -> String {
    "Relatório de Dados".to_string()
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_caption() -> String {
    "Relatório - {timestamp}".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_defaults() {
        let raw = r#"
            [processing]

            [fonte2]
            base_url = "https://api.example.com"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.processing.timezone, "America/Sao_Paulo");
        assert_eq!(config.processing.date_format, "%d/%m/%Y %H:%M");
        assert_eq!(config.fonte2.endpoint, "/dados");
        assert_eq!(config.fonte2.timeout_seconds, 30);
        assert!(!config.fonte2.pagination.enabled);
        assert_eq!(config.report.output_dir, "output");
        assert!(config.whatsapp.is_none());
        assert!(config.processing.timezone().is_ok());
    }

    #[test]
    fn full_config_parses() {
        let raw = r#"
            [processing]
            timezone = "America/Sao_Paulo"
            date_format = "%d/%m/%Y %H:%M"
            columns = ["timestamp", "status", "source"]

            [processing.column_mapping.fonte1]
            "Data" = "timestamp"
            "Status" = "status"

            [processing.column_mapping.fonte2]
            state = "status"

            [processing.status_translation]
            PEND = "Pendente"
            CRIT = "Crítico"

            [fonte1]
            file = "downloads/planilha.xlsx"

            [fonte2]
            base_url = "https://api.example.com"
            endpoint = "/incidents"

            [fonte2.auth]
            auth_type = "api_key"
            api_key_header = "X-Token"
            api_key_value = "secret"

            [fonte2.pagination]
            enabled = true
            per_page = 50
            max_pages = 5

            [report]
            title = "Painel de Incidentes"

            [whatsapp]
            webhook_url = "https://n8n.example.com/webhook/report"
            recipient = "5511999999999"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        let fonte1 = &config.processing.column_mapping["fonte1"];
        assert_eq!(fonte1["Data"], "timestamp");
        assert_eq!(config.fonte2.auth.auth_type, AuthType::ApiKey);
        assert_eq!(config.fonte2.pagination.per_page, 50);
        assert_eq!(config.whatsapp.unwrap().caption, "Relatório - {timestamp}");
    }
}
