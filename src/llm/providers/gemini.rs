//! Google Gemini backend (`generateContent` REST endpoint).
//!
//! The API key travels as a query parameter on the model-scoped URL.
//! Replies come back as candidates holding content parts; the first
//! candidate's text parts are concatenated. Image analysis sends an
//! `inline_data` part next to the text prompt.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use crate::llm::ProviderError;
use super::http_client;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, timeout_seconds: u64) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout_seconds)?,
            api_key,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{API_BASE}/{}:generateContent", self.model)
    }

    pub async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });
        self.send(payload).await
    }

    pub async fn analyze_image(
        &self,
        base64_image: &str,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let payload = json!({
            "contents": [{
                "parts": [
                    { "text": prompt },
                    {
                        "inline_data": {
                            "mime_type": "image/jpeg",
                            "data": base64_image,
                        },
                    },
                ],
            }],
        });
        self.send(payload).await
    }

    async fn send(&self, payload: serde_json::Value) -> Result<String, ProviderError> {
        debug!(model = %self.model, "sending gemini request");
        let response = self
            .client
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "gemini request failed (transport)");
                ProviderError::Request(e.to_string())
            })?;

        let response = super::openai::check_status(response).await?;

        let parsed = response.json::<GenerateContentResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize gemini response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        debug!(candidates = parsed.candidates.len(), "received gemini response");
        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Request("response contained no candidates".into()))?;
        let text = candidate
            .content
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");
        Ok(text)
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parses_candidate_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Shade cloth "},{"text":"helps."}]}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        assert_eq!(text, "Shade cloth helps.");
    }

    #[test]
    fn empty_candidates_parse_as_empty_list() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }
}
