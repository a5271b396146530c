//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `INDIGO_GARDENS_DIR` and `INDIGO_LOG_LEVEL` env overrides.
//!
//! Provider API keys are never sourced from TOML — they come from the
//! process environment (via `.env` when present) and are collected into an
//! explicit [`ProviderKeys`] value at startup, so the provider factory never
//! touches ambient state itself.

use std::{env, fs, path::{Path, PathBuf}};

use serde::Deserialize;
use tracing::level_filters::LevelFilter;

use crate::error::AppError;

/// HTTP channel configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Whether the HTTP channel is explicitly enabled.
    pub enabled: bool,
    /// Socket address to bind the listener to.
    pub bind: String,
}

/// LLM layer configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Provider used when a request names none (e.g. `"openai"`, `"dummy"`).
    pub default_provider: String,
    /// Per-request HTTP timeout in seconds, applied at client construction.
    pub timeout_seconds: u64,
}

/// Fully-resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one JSON record per garden (already expanded, no `~`).
    pub gardens_dir: PathBuf,
    pub log_level: String,
    pub http: HttpConfig,
    pub llm: LlmConfig,
}

/// API keys for the remote model backends, one per provider.
///
/// `None` means the key is absent; constructing a client for that provider
/// then fails with a configuration error before any network attempt.
#[derive(Debug, Clone, Default)]
pub struct ProviderKeys {
    pub openai: Option<String>,
    pub anthropic: Option<String>,
    pub gemini: Option<String>,
    pub groq: Option<String>,
}

impl ProviderKeys {
    /// Collect keys from the process environment. Called once at startup;
    /// the result is passed explicitly wherever clients are built.
    pub fn from_env() -> Self {
        Self {
            openai: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            anthropic: env::var("ANTHROPIC_API_KEY").ok().filter(|k| !k.is_empty()),
            gemini: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            groq: env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty()),
        }
    }
}

// ── Raw TOML shape ────────────────────────────────────────────────────────────

/// Raw TOML shape — `serde` target before resolution.
#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    service: RawService,
    #[serde(default)]
    http: RawHttp,
    #[serde(default)]
    llm: RawLlm,
}

#[derive(Deserialize)]
struct RawService {
    #[serde(default = "default_gardens_dir")]
    gardens_dir: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

#[derive(Deserialize)]
struct RawHttp {
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default = "default_http_bind")]
    bind: String,
}

#[derive(Deserialize)]
struct RawLlm {
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default = "default_llm_timeout")]
    timeout_seconds: u64,
}

fn default_true() -> bool {
    true
}

fn default_gardens_dir() -> String {
    "gardens".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_http_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_llm_provider() -> String {
    "openai".to_string()
}

fn default_llm_timeout() -> u64 {
    120
}

impl Default for RawService {
    fn default() -> Self {
        Self {
            gardens_dir: default_gardens_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Default for RawHttp {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: default_http_bind(),
        }
    }
}

impl Default for RawLlm {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            timeout_seconds: default_llm_timeout(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = env::var_os("HOME")
    {
        return PathBuf::from(home).join(rest);
    }
    PathBuf::from(path)
}

/// Load config from the given path, or `config/default.toml`, then apply
/// env-var overrides. If no path is given and `config/default.toml` does not
/// exist, built-in defaults are used.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let gardens_dir_override = env::var("INDIGO_GARDENS_DIR").ok();
    let log_level_override = env::var("INDIGO_LOG_LEVEL").ok();

    let raw = match config_path {
        Some(path) => parse_file(Path::new(path))?,
        None => {
            let default_path = Path::new("config/default.toml");
            if default_path.exists() {
                parse_file(default_path)?
            } else {
                RawConfig::default()
            }
        }
    };

    resolve(
        raw,
        gardens_dir_override.as_deref(),
        log_level_override.as_deref(),
    )
}

/// Load config from an explicit path with explicit overrides. Test-friendly
/// entry point — no ambient env lookups.
pub fn load_from(
    path: &Path,
    gardens_dir_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Config, AppError> {
    let raw = parse_file(path)?;
    resolve(raw, gardens_dir_override, log_level_override)
}

fn parse_file(path: &Path) -> Result<RawConfig, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))
}

fn resolve(
    raw: RawConfig,
    gardens_dir_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Config, AppError> {
    let gardens_dir = expand_home(gardens_dir_override.unwrap_or(&raw.service.gardens_dir));
    let log_level = log_level_override
        .unwrap_or(&raw.service.log_level)
        .to_string();

    // Catch a bad level here rather than at logger install time.
    log_level
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Config(format!("unrecognised log level '{log_level}'")))?;

    Ok(Config {
        gardens_dir,
        log_level,
        http: HttpConfig {
            enabled: raw.http.enabled,
            bind: raw.http.bind,
        },
        llm: LlmConfig {
            default_provider: raw.llm.provider,
            timeout_seconds: raw.llm.timeout_seconds,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL_TOML: &str = r#"
[service]
gardens_dir = "gardens"
log_level = "info"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parse_basic_config() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.gardens_dir, PathBuf::from("gardens"));
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), None, None).unwrap();
        assert!(cfg.http.enabled);
        assert_eq!(cfg.http.bind, "127.0.0.1:3000");
        assert_eq!(cfg.llm.default_provider, "openai");
        assert_eq!(cfg.llm.timeout_seconds, 120);
    }

    #[test]
    fn llm_section_parses() {
        let f = write_toml(
            r#"
[llm]
default = "anthropic"
timeout_seconds = 30
"#,
        );
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.llm.default_provider, "anthropic");
        assert_eq!(cfg.llm.timeout_seconds, 30);
    }

    #[test]
    fn overrides_win_over_file_values() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), Some("/tmp/other-gardens"), Some("debug")).unwrap();
        assert_eq!(cfg.gardens_dir, PathBuf::from("/tmp/other-gardens"));
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = load_from(Path::new("/nonexistent/indigo.toml"), None, None).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let f = write_toml("not = [valid");
        let err = load_from(f.path(), None, None).unwrap_err();
        assert!(err.to_string().contains("parse error"));
    }

    #[test]
    fn unrecognised_log_level_is_config_error() {
        let f = write_toml(
            r#"
[service]
log_level = "verbose"
"#,
        );
        let err = load_from(f.path(), None, None).unwrap_err();
        assert!(err.to_string().contains("verbose"));
    }

    #[test]
    fn unrecognised_log_level_override_is_config_error() {
        let f = write_toml(MINIMAL_TOML);
        assert!(load_from(f.path(), None, Some("loud")).is_err());
    }

    #[test]
    fn expand_home_passthrough_for_absolute() {
        assert_eq!(expand_home("/var/data"), PathBuf::from("/var/data"));
    }
}
