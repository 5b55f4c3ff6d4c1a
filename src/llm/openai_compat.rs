//! OpenAI-compatible chat completions client.
//!
//! Used for both OpenRouter and OpenAI, which share the wire format.
//! Images are sent as `image_url` parts carrying a base64 data URL.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::error::LlmError;

use super::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, LlmProvider,
};

/// OpenRouter chat completions endpoint.
pub const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// OpenAI chat completions endpoint.
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Client for any endpoint speaking the OpenAI chat completions protocol.
pub struct OpenAiCompatProvider {
    name: String,
    endpoint: String,
    api_key: Option<SecretString>,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: Option<SecretString>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let name = name.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::RequestFailed {
                provider: name.clone(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            name,
            endpoint: endpoint.into(),
            api_key,
            model: model.into(),
            timeout,
            client,
        })
    }

    /// Build the JSON request body.
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let messages: Vec<serde_json::Value> =
            request.messages.iter().map(message_to_openai).collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }
        body
    }
}

/// Convert a message to OpenAI format. Multimodal messages use the
/// content-parts array; plain text uses a bare string.
fn message_to_openai(message: &ChatMessage) -> serde_json::Value {
    if message.images.is_empty() {
        return serde_json::json!({
            "role": message.role.as_str(),
            "content": message.content,
        });
    }

    let mut parts = vec![serde_json::json!({
        "type": "text",
        "text": message.content,
    })];
    for image in &message.images {
        parts.push(serde_json::json!({
            "type": "image_url",
            "image_url": {
                "url": format!("data:{};base64,{}", image.media_type, STANDARD.encode(&image.data)),
            },
        }));
    }
    serde_json::json!({
        "role": message.role.as_str(),
        "content": parts,
    })
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

fn parse_response(provider: &str, body: &str) -> Result<CompletionResponse, LlmError> {
    let response: OpenAiResponse =
        serde_json::from_str(body).map_err(|e| LlmError::InvalidResponse {
            provider: provider.to_string(),
            reason: format!("Failed to parse response: {e}"),
        })?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse {
            provider: provider.to_string(),
            reason: "No choices in response".to_string(),
        })?;

    let content = choice
        .message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| LlmError::InvalidResponse {
            provider: provider.to_string(),
            reason: "No response from AI".to_string(),
        })?;

    let (input_tokens, output_tokens) = response
        .usage
        .map(|u| (u.prompt_tokens, u.completion_tokens))
        .unwrap_or((0, 0));

    Ok(CompletionResponse {
        content,
        input_tokens,
        output_tokens,
        finish_reason: FinishReason::from_wire(choice.finish_reason.as_deref()),
    })
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn request_timeout(&self) -> Duration {
        self.timeout
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| LlmError::MissingApiKey {
                provider: self.name.clone(),
            })?;

        let body = self.build_request_body(&request);
        debug!(
            provider = %self.name,
            model = %self.model,
            multimodal = request.has_images(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        provider: self.name.clone(),
                        timeout: self.timeout,
                    }
                } else {
                    LlmError::RequestFailed {
                        provider: self.name.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let body_text = response.text().await.map_err(|e| LlmError::RequestFailed {
            provider: self.name.clone(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(LlmError::HttpStatus {
                provider: self.name.clone(),
                status: status.as_u16(),
                body: body_text.chars().take(500).collect(),
            });
        }

        parse_response(&self.name, &body_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::ImageAttachment;

    fn provider() -> OpenAiCompatProvider {
        OpenAiCompatProvider::new(
            "openrouter",
            OPENROUTER_API_URL,
            Some(SecretString::from("sk-test")),
            "google/gemini-flash-1.5",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn text_message_uses_plain_content() {
        let body = provider().build_request_body(
            &CompletionRequest::new(vec![ChatMessage::user("hello")]).with_max_tokens(100),
        );
        assert_eq!(body["model"], "google/gemini-flash-1.5");
        assert_eq!(body["max_tokens"], 100);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn image_message_uses_data_url_part() {
        let message = ChatMessage::user("analyze")
            .with_image(ImageAttachment::from_bytes(b"\x89PNG\r\n\x1a\n".to_vec()));
        let body = provider().build_request_body(&CompletionRequest::new(vec![message]));

        let parts = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[1]["type"], "image_url");
        let url = parts[1]["image_url"]["url"].as_str().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        assert!(url.ends_with("iVBORw0KGgo="));
    }

    #[test]
    fn parse_response_extracts_first_choice() {
        let body = r#"{
            "choices": [{"message": {"content": "{\"a\": 1}"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4}
        }"#;
        let response = parse_response("openrouter", body).unwrap();
        assert_eq!(response.content, "{\"a\": 1}");
        assert_eq!(response.input_tokens, 12);
        assert_eq!(response.output_tokens, 4);
        assert_eq!(response.finish_reason, FinishReason::Stop);
    }

    #[test]
    fn parse_response_rejects_empty_choices() {
        let err = parse_response("openrouter", r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse { .. }));
    }

    #[test]
    fn parse_response_rejects_null_content() {
        let body = r#"{"choices": [{"message": {"content": null}}]}"#;
        let err = parse_response("openrouter", body).unwrap_err();
        assert!(err.to_string().contains("No response from AI"));
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let provider = OpenAiCompatProvider::new(
            "openrouter",
            "http://127.0.0.1:9/unused",
            None,
            "m",
            Duration::from_secs(1),
        )
        .unwrap();
        let err = provider
            .complete(CompletionRequest::new(vec![ChatMessage::user("x")]))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey { .. }));
    }
}
