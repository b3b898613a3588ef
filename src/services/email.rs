use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::config::Settings;

/// Thin client over the transactional email collaborator. Absent entirely
/// when `EMAIL_API_URL` is unset, in which case registration skips
/// verification and accounts are created pre-verified.
#[derive(Debug, Clone)]
pub(crate) struct EmailService {
    client: Client,
    api_url: String,
    api_key: String,
    from_address: String,
    frontend_url: String,
}

impl EmailService {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Option<Self>> {
        if settings.email().api_url.is_empty() {
            return Ok(None);
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build email HTTP client")?;

        Ok(Some(Self {
            client,
            api_url: settings.email().api_url.trim_end_matches('/').to_string(),
            api_key: settings.email().api_key.clone(),
            from_address: settings.email().from_address.clone(),
            frontend_url: settings.api().frontend_url.trim_end_matches('/').to_string(),
        }))
    }

    /// Sends the verification link. The raw token goes to the recipient;
    /// only its hash is ever persisted.
    pub(crate) async fn send_verification(
        &self,
        recipient: &str,
        name: &str,
        token: &str,
    ) -> Result<()> {
        let link = format!("{}/verify-email/{}", self.frontend_url, token);
        let payload = json!({
            "from": self.from_address,
            "to": recipient,
            "subject": "Verify your ChemTest account",
            "html": format!(
                "<p>Hi {name},</p>\
                 <p>Welcome to ChemTest. Confirm your email address to activate \
                 your account:</p>\
                 <p><a href=\"{link}\">{link}</a></p>\
                 <p>This link expires in 24 hours. If you did not sign up, you \
                 can ignore this message.</p>"
            ),
        });

        let response = self
            .client
            .post(format!("{}/send", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Failed to call email API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|parsed| {
                    parsed
                        .get("message")
                        .or_else(|| parsed.get("error"))
                        .and_then(Value::as_str)
                        .map(ToString::to_string)
                })
                .unwrap_or(body);
            anyhow::bail!("Email API returned status {}: {}", status, detail);
        }

        Ok(())
    }
}
