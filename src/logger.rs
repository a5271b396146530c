//! Logging setup for the service binary.
//!
//! The effective filter comes from three sources, strongest first: an
//! explicit CLI level, `RUST_LOG`, then the configured default (which
//! config loading has already validated). Output goes to stderr so the
//! service's stdout stays clean.

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Install the global tracing subscriber. Call once, after config load.
pub fn init(config_level: &str, cli_level: Option<&str>) -> Result<(), AppError> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = resolve(config_level, cli_level, rust_log.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("logger already installed: {e}")))
}

fn resolve(
    config_level: &str,
    cli_level: Option<&str>,
    rust_log: Option<&str>,
) -> Result<EnvFilter, AppError> {
    let directive = cli_level.or(rust_log).unwrap_or(config_level);
    EnvFilter::try_new(directive)
        .map_err(|e| AppError::Logger(format!("bad log filter '{directive}': {e}")))
}
