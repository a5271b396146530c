//! Model backend implementations and the construction factory.
//!
//! `build(provider_id, keys, timeout_seconds)` is the only way clients are
//! made. Keys arrive as an explicit [`ProviderKeys`](crate::config::ProviderKeys)
//! value — the factory never reads the environment, so construction is fully
//! testable without env mutation. Adding a new backend = new module + new
//! match arm.

pub mod anthropic;
pub mod dummy;
pub mod gemini;
pub mod groq;
pub mod openai;

use crate::config::ProviderKeys;
use crate::llm::{LlmClient, ProviderError};

/// Construct an [`LlmClient`] for `provider_id`.
///
/// Fails fast before any network attempt: an unrecognised identifier is
/// [`ProviderError::UnknownProvider`], a recognised one without its key is
/// [`ProviderError::MissingKey`]. `timeout_seconds` bounds every request
/// the resulting client makes.
pub fn build(
    provider_id: &str,
    keys: &ProviderKeys,
    timeout_seconds: u64,
) -> Result<LlmClient, ProviderError> {
    match provider_id.to_ascii_lowercase().as_str() {
        "dummy" => Ok(LlmClient::Dummy(dummy::DummyClient::new())),
        "openai" => {
            let key = require(&keys.openai, "OPENAI_API_KEY")?;
            Ok(LlmClient::OpenAi(openai::OpenAiClient::new(key, timeout_seconds)?))
        }
        "anthropic" => {
            let key = require(&keys.anthropic, "ANTHROPIC_API_KEY")?;
            Ok(LlmClient::Anthropic(anthropic::AnthropicClient::new(key, timeout_seconds)?))
        }
        "gemini" => {
            let key = require(&keys.gemini, "GEMINI_API_KEY")?;
            Ok(LlmClient::Gemini(gemini::GeminiClient::new(key, timeout_seconds)?))
        }
        "groq" => {
            let key = require(&keys.groq, "GROQ_API_KEY")?;
            Ok(LlmClient::Groq(groq::GroqClient::new(key, timeout_seconds)?))
        }
        _ => Err(ProviderError::UnknownProvider(provider_id.to_string())),
    }
}

fn require(key: &Option<String>, name: &'static str) -> Result<String, ProviderError> {
    key.clone().ok_or(ProviderError::MissingKey(name))
}

/// Build an HTTP client with the per-request timeout baked in.
/// Shared by all remote backends.
pub(super) fn http_client(timeout_seconds: u64) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))
}
