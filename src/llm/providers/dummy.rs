//! Dummy backend — echoes the prompt back, or returns a canned reply.
//! Used for exercising the full request path without an API key, and by
//! tests that need a scripted model.

use crate::llm::ProviderError;

#[derive(Debug, Clone, Default)]
pub struct DummyClient {
    reply: Option<String>,
    fail: bool,
}

impl DummyClient {
    /// Echo variant: `complete` returns its prompt verbatim.
    pub fn new() -> Self {
        Self { reply: None, fail: false }
    }

    /// Scripted variant: `complete` always returns `reply`.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self { reply: Some(reply.into()), fail: false }
    }

    /// Failing variant: every call returns a `Request` error, standing in
    /// for an unreachable backend.
    pub fn failing() -> Self {
        Self { reply: None, fail: true }
    }

    pub async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        if self.fail {
            return Err(ProviderError::Request("scripted failure".into()));
        }
        Ok(match &self.reply {
            Some(reply) => reply.clone(),
            None => prompt.to_string(),
        })
    }

    pub async fn analyze_image(
        &self,
        _base64_image: &str,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        if self.fail {
            return Err(ProviderError::Request("scripted failure".into()));
        }
        Ok(match &self.reply {
            Some(reply) => reply.clone(),
            None => format!("[dummy analysis] {prompt}"),
        })
    }
}
