//! OpenAI chat completion backend (`/v1/chat/completions`).
//!
//! All OpenAI wire types are private to this module — callers never see
//! them. Image analysis sends the picture inline as a data URL content
//! part, matching the vision message format.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use crate::llm::ProviderError;
use super::http_client;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, timeout_seconds: u64) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout_seconds)?,
            api_key,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let payload = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        });
        self.send(payload).await
    }

    pub async fn analyze_image(
        &self,
        base64_image: &str,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let payload = json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    {
                        "type": "image_url",
                        "image_url": { "url": format!("data:image/jpeg;base64,{base64_image}") },
                    },
                ],
            }],
        });
        self.send(payload).await
    }

    async fn send(&self, payload: serde_json::Value) -> Result<String, ProviderError> {
        debug!(model = %self.model, "sending openai request");
        let response = self
            .client
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "openai request failed (transport)");
                ProviderError::Request(e.to_string())
            })?;

        let response = check_status(response).await?;

        let parsed = response.json::<ChatResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize openai response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        debug!(choices = parsed.choices.len(), "received openai response");
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Request("response contained no choices".into()))?;
        // Null content is a degenerate-but-valid reply, not an error.
        Ok(choice.message.content.unwrap_or_default())
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// Error envelope used by OpenAI and compatible APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Consume the response and return it if successful, or a structured error.
pub(super) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = if let Ok(env) = serde_json::from_str::<ErrorEnvelope>(&body) {
        format!("HTTP {status}: {}", env.error.message)
    } else {
        format!("HTTP {status}: {body}")
    };

    error!(%status, %message, "model request returned HTTP error");
    Err(ProviderError::Request(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parses_content() {
        let body = r#"{"choices":[{"message":{"content":"Water deeply, less often."}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Water deeply, less often.")
        );
    }

    #[test]
    fn response_tolerates_null_content() {
        let body = r#"{"choices":[{"message":{"content":null}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[test]
    fn error_envelope_parses() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        let env: ErrorEnvelope = serde_json::from_str(body).unwrap();
        assert!(env.error.message.contains("Incorrect API key"));
    }
}
