//! Groq backend — OpenAI-compatible chat completions, no vision support.
//!
//! The lowest-capability tier: `complete` works normally but image
//! analysis is not available. Instead of erroring, the client returns a
//! fixed advisory string so the caller's flow is uninterrupted. This is a
//! capability-degradation contract carried over from the original service;
//! callers can only tell the cases apart by content.

use reqwest::Client;
use serde_json::json;
use tracing::{debug, error};

use crate::llm::ProviderError;
use super::http_client;

const API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_MODEL: &str = "mixtral-8x7b-32768";

/// Fixed reply for image requests — Groq has no vision endpoint.
pub const IMAGE_UNSUPPORTED: &str =
    "Image analysis not supported for Groq provider. Please use OpenAI, Anthropic, or Gemini.";

#[derive(Debug, Clone)]
pub struct GroqClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GroqClient {
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

        debug!(model = %self.model, "sending groq request");
        let response = self
            .client
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "groq request failed (transport)");
                ProviderError::Request(e.to_string())
            })?;

        let response = super::openai::check_status(response).await?;

        // Groq mirrors the OpenAI response shape exactly.
        #[derive(serde::Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }
        #[derive(serde::Deserialize)]
        struct Choice {
            message: ChoiceMessage,
        }
        #[derive(serde::Deserialize)]
        struct ChoiceMessage {
            #[serde(default)]
            content: Option<String>,
        }

        let parsed = response.json::<ChatResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize groq response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Request("response contained no choices".into()))?;
        Ok(choice.message.content.unwrap_or_default())
    }

    /// No request is made; the fixed advisory string is the "analysis".
    pub fn analyze_image_unsupported(&self) -> String {
        IMAGE_UNSUPPORTED.to_string()
    }
}
