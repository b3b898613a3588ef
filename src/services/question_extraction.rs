use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;

use crate::core::config::Settings;
use crate::schemas::extraction::ExtractedQuestion;

/// Client for the AI question-extraction collaborator: a teacher uploads a
/// PDF or image of a question paper and gets back draft MCQs to review.
/// Absent entirely when `EXTRACTOR_BASE_URL` is unset.
#[derive(Debug, Clone)]
pub(crate) struct QuestionExtractor {
    client: Client,
    base_url: String,
    api_key: String,
}

impl QuestionExtractor {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Option<Self>> {
        if settings.extractor().base_url.is_empty() {
            return Ok(None);
        }

        let timeout = Duration::from_secs(settings.extractor().timeout_seconds);
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(20))
            .timeout(timeout)
            .build()
            .context("Failed to build extractor HTTP client")?;

        Ok(Some(Self {
            client,
            base_url: settings.extractor().base_url.trim_end_matches('/').to_string(),
            api_key: settings.extractor().api_key.clone(),
        }))
    }

    pub(crate) async fn extract(
        &self,
        file_name: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Result<Vec<ExtractedQuestion>> {
        let mut part = Part::bytes(bytes).file_name(file_name);
        if let Some(mime) = content_type {
            part = part.mime_str(&mime).context("Invalid upload content type")?;
        }
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/extract", self.base_url))
            .header("X-Api-Key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .context("Failed to call question extraction API")?;

        let status = response.status();
        let raw_body =
            response.text().await.context("Failed to read extraction response")?;
        let parsed = serde_json::from_str::<Value>(&raw_body).map_err(|err| {
            anyhow::anyhow!(
                "Extractor returned non-JSON body (status {}): {}: {}",
                status,
                err,
                raw_body
            )
        })?;

        if !status.is_success() {
            anyhow::bail!(
                "Question extraction failed (status {}): {}",
                status,
                extract_error_message(&parsed)
            );
        }

        let questions = parsed
            .get("questions")
            .cloned()
            .unwrap_or(Value::Array(Vec::new()));
        serde_json::from_value(questions).context("Extractor returned malformed question list")
    }
}

fn extract_error_message(payload: &Value) -> String {
    payload
        .get("detail")
        .or_else(|| payload.get("message"))
        .or_else(|| payload.get("error"))
        .and_then(Value::as_str)
        .unwrap_or("unknown_error")
        .to_string()
}
