use crate::error::{clip, GatewayError};
use async_trait::async_trait;
use meetmap_core::config::ChatConfig;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait ChatCompleter: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GatewayError>;
}

/// Client for an OpenAI-style `/chat/completions` endpoint.
pub struct ChatCompletionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatCompletionClient {
    pub fn from_config(config: &ChatConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: format!(
                "{}/chat/completions",
                config.base_url.trim_end_matches('/')
            ),
            api_key: config.api_key().map(str::to_string),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl ChatCompleter for ChatCompletionClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GatewayError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GatewayError::NotConfigured("chat API key"))?;

        let payload = json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "stream": false,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if status.as_u16() >= 300 {
            return Err(GatewayError::Http {
                status: status.as_u16(),
                body: clip(&text, 1000),
            });
        }

        let value: Value =
            serde_json::from_str(&text).map_err(|_| GatewayError::NonJson(clip(&text, 800)))?;
        completion_text(&value)
    }
}

/// Pull the answer out of the response shapes chat backends are known to use.
pub fn completion_text(response: &Value) -> Result<String, GatewayError> {
    let candidates = [
        response.pointer("/choices/0/message/content"),
        response.pointer("/choices/0/text"),
    ];
    if let Some(text) = candidates.into_iter().flatten().find_map(Value::as_str) {
        return Ok(text.to_string());
    }

    ["output_text", "content", "answer"]
        .iter()
        .filter_map(|key| response.get(*key).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| GatewayError::UnexpectedShape(clip(&response.to_string(), 800)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_text_shapes() {
        let openai = json!({"choices": [{"message": {"role": "assistant", "content": "Dave owns logs."}}]});
        assert_eq!(completion_text(&openai).unwrap(), "Dave owns logs.");

        let legacy = json!({"choices": [{"text": "legacy"}]});
        assert_eq!(completion_text(&legacy).unwrap(), "legacy");

        let flat = json!({"output_text": "", "answer": "flat"});
        assert_eq!(completion_text(&flat).unwrap(), "flat");
    }

    #[test]
    fn test_completion_text_unexpected_shape() {
        let err = completion_text(&json!({"error": "nope"})).unwrap_err();
        match err {
            GatewayError::UnexpectedShape(body) => assert!(body.contains("nope")),
            other => panic!("expected unexpected shape, got {other:?}"),
        }
    }

    #[test]
    fn test_role_wire_names() {
        let message: ChatMessage =
            serde_json::from_str(r#"{"role": "assistant", "content": "hi"}"#).unwrap();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(
            serde_json::to_value(ChatMessage::new(Role::System, "ctx")).unwrap(),
            json!({"role": "system", "content": "ctx"})
        );
        assert!(serde_json::from_str::<ChatMessage>(r#"{"role": "tool", "content": ""}"#).is_err());
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let client = ChatCompletionClient::from_config(&ChatConfig::default()).unwrap();
        let err = client
            .complete(&[ChatMessage::new(Role::User, "hello")])
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotConfigured(_)));
    }
}
