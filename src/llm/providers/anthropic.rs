//! Anthropic Messages API backend (`/v1/messages`).
//!
//! Auth is `x-api-key` plus a pinned `anthropic-version` header. Replies
//! arrive as a list of content blocks; the first text block is the reply.
//! Image analysis sends a base64 source block followed by the text prompt.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use crate::llm::ProviderError;
use super::http_client;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
}

impl AnthropicClient {
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
            "max_tokens": MAX_TOKENS,
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
            "max_tokens": MAX_TOKENS,
            "messages": [{
                "role": "user",
                "content": [
                    {
                        "type": "image",
                        "source": {
                            "type": "base64",
                            "media_type": "image/jpeg",
                            "data": base64_image,
                        },
                    },
                    { "type": "text", "text": prompt },
                ],
            }],
        });
        self.send(payload).await
    }

    async fn send(&self, payload: serde_json::Value) -> Result<String, ProviderError> {
        debug!(model = %self.model, "sending anthropic request");
        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "anthropic request failed (transport)");
                ProviderError::Request(e.to_string())
            })?;

        let response = super::openai::check_status(response).await?;

        let parsed = response.json::<MessagesResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize anthropic response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        debug!(blocks = parsed.content.len(), "received anthropic response");
        let block = parsed
            .content
            .into_iter()
            .find(|b| b.kind == "text")
            .ok_or_else(|| ProviderError::Request("response contained no text block".into()))?;
        Ok(block.text.unwrap_or_default())
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}
