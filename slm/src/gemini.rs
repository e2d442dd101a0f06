use crate::error::{clip, GatewayError};
use crate::generator::TextGenerator;
use async_trait::async_trait;
use meetmap_core::config::LlmConfig;
use serde_json::{json, Value};
use std::time::Duration;

/// `generateContent` client for the text-generation backend.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: format!(
                "{}/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                model
            ),
            api_key: api_key.into(),
        })
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>, GatewayError> {
        let Some(api_key) = config.api_key() else {
            return Ok(None);
        };
        Self::new(
            &config.base_url,
            &config.model,
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
        .map(Some)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        let body = json!({"contents": [{"parts": [{"text": prompt}]}]});
        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GatewayError::Http {
                status: status.as_u16(),
                body: clip(&text, 1000),
            });
        }

        let text = response.text().await?;
        let value: Value =
            serde_json::from_str(&text).map_err(|_| GatewayError::NonJson(clip(&text, 800)))?;
        Ok(candidate_text(&value))
    }
}

/// Text of the first part of the first candidate, or empty.
pub fn candidate_text(response: &Value) -> String {
    response
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
