use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use chrono_tz::Tz;
use reqwest::multipart::{Form, Part};
use tracing::info;

use crate::config::WhatsAppConfig;
use crate::error::{ReportError, Result};

/// Delivers the rendered report artifact through an n8n-style WhatsApp
/// webhook: multipart POST with the file plus `phone` and `caption` fields.
pub struct WhatsAppSender {
    config: WhatsAppConfig,
    client: reqwest::Client,
    timezone: Tz,
}

impl WhatsAppSender {
    pub fn new(config: &WhatsAppConfig, timezone: Tz) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { config: config.clone(), client, timezone })
    }

    fn caption(&self) -> String {
        let now = Utc::now().with_timezone(&self.timezone);
        self.config
            .caption
            .replace("{timestamp}", &now.format("%d/%m/%Y %H:%M").to_string())
    }

    pub async fn send_report(&self, artifact: &Path) -> Result<()> {
        let bytes = std::fs::read(artifact)?;
        let file_name = artifact
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("report.html")
            .to_string();

        info!(
            "sending report to {} via webhook ({} bytes)",
            self.config.recipient,
            bytes.len()
        );

        let part = Part::bytes(bytes).file_name(file_name).mime_str("text/html")?;
        let form = Form::new()
            .text("phone", self.config.recipient.clone())
            .text("caption", self.caption())
            .part("file", part);

        let response = self
            .client
            .post(&self.config.webhook_url)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReportError::Delivery {
                message: format!("webhook returned status {}", response.status()),
            });
        }
        info!("report delivered");
        Ok(())
    }
}
