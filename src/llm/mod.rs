//! Model client abstraction.
//!
//! [`LlmClient`] is an enum over concrete backend implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency.
//! Client instances are shared immutable capabilities — clone them freely
//! (`reqwest::Client` is an `Arc` internally).
//!
//! Three capabilities, per the original service contract:
//! - `complete` — one prompt in, one text reply out.
//! - `generate_tags` — derive short labels by asking for a comma-separated
//!   list and splitting the reply. Implemented once here; identical across
//!   backends by construction.
//! - `analyze_image` — image + prompt in, text analysis out. Backends
//!   without vision return a fixed advisory string instead of failing.

pub mod providers;

use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Configuration-time: the provider identifier matched no backend.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    /// Configuration-time: the chosen backend's API key is absent.
    #[error("missing API key: {0}")]
    MissingKey(&'static str),
    /// Remote call failed or the response had no usable shape.
    #[error("provider request failed: {0}")]
    Request(String),
}

// ── Client enum ───────────────────────────────────────────────────────────────

/// All available model backends.
///
/// Adding a backend = new module + new variant + new match arms below.
#[derive(Debug, Clone)]
pub enum LlmClient {
    Dummy(providers::dummy::DummyClient),
    OpenAi(providers::openai::OpenAiClient),
    Anthropic(providers::anthropic::AnthropicClient),
    Gemini(providers::gemini::GeminiClient),
    Groq(providers::groq::GroqClient),
}

impl LlmClient {
    /// Send `prompt` to the backend and return its text reply.
    ///
    /// An empty reply is a degenerate but valid result — errors are reserved
    /// for transport failures and structurally unusable responses.
    pub async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        match self {
            LlmClient::Dummy(c) => c.complete(prompt).await,
            LlmClient::OpenAi(c) => c.complete(prompt).await,
            LlmClient::Anthropic(c) => c.complete(prompt).await,
            LlmClient::Gemini(c) => c.complete(prompt).await,
            LlmClient::Groq(c) => c.complete(prompt).await,
        }
    }

    /// Derive 3–5 short labels for `text` by asking for a comma-separated
    /// list and splitting the reply on commas.
    ///
    /// The reply is accepted verbatim — no count or content validation.
    /// A model that returns nothing usable yields an empty list.
    pub async fn generate_tags(&self, text: &str) -> Result<Vec<String>, ProviderError> {
        let prompt = format!(
            "Extract 3-5 relevant gardening tags from this text. \
             Return only the tags as a comma-separated list.\n\nText: {text}"
        );
        let reply = self.complete(&prompt).await?;
        Ok(split_tags(&reply))
    }

    /// Send a base64-encoded image plus `prompt`, returning the text analysis.
    ///
    /// Backends without vision support (Groq) return a fixed advisory string
    /// rather than an error — callers cannot distinguish "analysis performed"
    /// from "analysis unsupported" except by content. Known contract.
    pub async fn analyze_image(
        &self,
        base64_image: &str,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        match self {
            LlmClient::Dummy(c) => c.analyze_image(base64_image, prompt).await,
            LlmClient::OpenAi(c) => c.analyze_image(base64_image, prompt).await,
            LlmClient::Anthropic(c) => c.analyze_image(base64_image, prompt).await,
            LlmClient::Gemini(c) => c.analyze_image(base64_image, prompt).await,
            LlmClient::Groq(c) => Ok(c.analyze_image_unsupported()),
        }
    }
}

/// Split a comma-separated tag reply, trimming whitespace per piece.
/// Empty pieces are dropped so a blank reply yields an empty list.
fn split_tags(reply: &str) -> Vec<String> {
    reply
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect()
}
