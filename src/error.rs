//! Application-wide error types.

use thiserror::Error;

use crate::llm::ProviderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    /// Remote model call failed or returned unusable content.
    /// Surfaced to the caller verbatim — no retry, no fallback provider.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Garden name has no stored record.
    #[error("garden not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("missing field".into());
        assert!(e.to_string().contains("missing field"));
    }

    #[test]
    fn not_found_names_the_garden() {
        let e = AppError::NotFound("backyard".into());
        assert!(e.to_string().contains("backyard"));
        assert!(e.to_string().contains("not found"));
    }

    #[test]
    fn provider_error_converts() {
        let e: AppError = ProviderError::UnknownProvider("mistral".into()).into();
        assert!(e.to_string().contains("mistral"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        let _: &dyn Error = &e;
    }
}
