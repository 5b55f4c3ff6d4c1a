//! Configuration types.
//!
//! Everything is read from the process environment at startup.

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::assessment::SessionLimits;
use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Provider for wellness scoring and insights.
    pub text_llm: LlmConfig,
    /// Provider for photo analyses.
    pub vision_llm: LlmConfig,
    /// Idle timeout and capacity of the session table.
    pub sessions: SessionLimits,
}

impl AppConfig {
    /// Read configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = parse_or(&lookup, "WELLNESS_PORT", 8080)?;
        let timeout = Duration::from_secs(parse_or(&lookup, "AI_TIMEOUT_SECS", 30u64)?);

        let text_llm = llm_config(
            &lookup,
            "WELLNESS_LLM",
            LlmBackend::Gemini,
            "gemini-1.5-flash",
            timeout,
        )?;
        let vision_llm = llm_config(
            &lookup,
            "VISION_LLM",
            LlmBackend::OpenRouter,
            "google/gemini-flash-1.5",
            timeout,
        )?;

        let defaults = SessionLimits::default();
        let idle_secs: u64 = parse_or(
            &lookup,
            "SESSION_IDLE_TIMEOUT_SECS",
            defaults.idle_timeout.as_secs(),
        )?;
        let max_sessions: usize = parse_or(&lookup, "MAX_SESSIONS", defaults.max_sessions)?;
        if idle_secs == 0 {
            return Err(positive("SESSION_IDLE_TIMEOUT_SECS"));
        }
        if max_sessions == 0 {
            return Err(positive("MAX_SESSIONS"));
        }

        Ok(Self {
            port,
            text_llm,
            vision_llm,
            sessions: SessionLimits {
                idle_timeout: Duration::from_secs(idle_secs),
                max_sessions,
            },
        })
    }
}

/// Parse `key` if set, otherwise use `default`. A set but malformed value
/// is an error rather than silently defaulted.
fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match lookup(key).filter(|s| !s.trim().is_empty()) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("'{raw}': {e}"),
        }),
        None => Ok(default),
    }
}

fn positive(key: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: "must be greater than zero".to_string(),
    }
}

/// Build one provider config from `{prefix}_BACKEND`, `{prefix}_MODEL` and
/// `{prefix}_ENDPOINT`, taking the key from the backend's own variable.
fn llm_config(
    lookup: &impl Fn(&str) -> Option<String>,
    prefix: &str,
    default_backend: LlmBackend,
    default_model: &str,
    timeout: Duration,
) -> Result<LlmConfig, ConfigError> {
    let backend: LlmBackend = parse_or(lookup, &format!("{prefix}_BACKEND"), default_backend)?;
    let model = lookup(&format!("{prefix}_MODEL"))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default_model.to_string());
    let endpoint = lookup(&format!("{prefix}_ENDPOINT")).filter(|s| !s.trim().is_empty());
    let api_key = lookup(backend.api_key_env())
        .filter(|s| !s.trim().is_empty())
        .map(SecretString::from);

    Ok(LlmConfig {
        backend,
        api_key,
        model,
        endpoint,
        timeout,
    })
}
