//! Configuration for the LLM oracle.
//!
//! Everything is read from environment variables. An unset
//! `PESTEL_LLM_BACKEND` means no AI oracle is configured and the run uses
//! the deterministic fallback only.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::OracleServiceError;

/// Default base URL for a local Ollama server.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Complete oracle configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleConfig {
    /// Backend connection settings.
    pub backend: LlmBackendConfig,
    /// Extra attempts after a failed backend call (default 2).
    pub retries: u32,
    /// Delay before the first retry; doubles on every further retry.
    pub backoff: Duration,
    /// Whether identical prompts reuse earlier responses.
    pub cache_enabled: bool,
    /// Maximum cached responses before the oldest is evicted.
    pub cache_capacity: usize,
    /// Directory overriding the built-in prompt templates.
    pub templates_dir: Option<PathBuf>,
}

/// Configuration for a single LLM backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmBackendConfig {
    /// The backend protocol.
    pub backend_type: BackendType,
    /// Base API URL (e.g. `https://api.openai.com/v1`).
    pub api_url: String,
    /// API key; empty for a local Ollama server.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
}

/// Supported LLM backend protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// OpenAI-compatible chat completions (`OpenAI`, `DeepSeek`, Ollama's
    /// compatibility endpoint).
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
    /// Ollama's native generate API.
    Ollama,
}

impl BackendType {
    /// Parse a backend name case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`OracleServiceError::Config`] for an unknown name.
    pub fn parse(name: &str) -> Result<Self, OracleServiceError> {
        match name.trim().to_lowercase().as_str() {
            "openai" | "deepseek" | "ollama-openai" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            other => Err(OracleServiceError::config(format!("unknown backend type: {other}"))),
        }
    }

    /// Whether calls to this backend need an API key.
    pub const fn requires_key(self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

impl OracleConfig {
    /// Load configuration from the process environment.
    ///
    /// Variables:
    /// - `PESTEL_LLM_BACKEND` -- openai, deepseek, ollama-openai, anthropic,
    ///   claude or ollama; unset means no AI oracle
    /// - `PESTEL_LLM_API_URL` -- base URL (defaults to a local Ollama for
    ///   the `ollama` backend)
    /// - `PESTEL_LLM_API_KEY` -- API key (optional for `ollama`)
    /// - `PESTEL_LLM_MODEL` -- model name
    /// - `PESTEL_ORACLE_RETRIES` -- retry count (default 2)
    /// - `PESTEL_ORACLE_BACKOFF_MS` -- first retry delay (default 250)
    /// - `PESTEL_ORACLE_CACHE` -- enable the response cache (default `true`)
    /// - `PESTEL_ORACLE_CACHE_CAPACITY` -- cache size (default 1024)
    /// - `PESTEL_TEMPLATES_DIR` -- prompt template override directory
    ///
    /// # Errors
    ///
    /// Returns [`OracleServiceError::Config`] when a variable is missing or
    /// does not parse.
    pub fn from_env() -> Result<Option<Self>, OracleServiceError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`OracleConfig::from_env`].
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, OracleServiceError> {
        let Some(backend_name) = lookup("PESTEL_LLM_BACKEND").filter(|v| !v.trim().is_empty())
        else {
            return Ok(None);
        };
        let backend_type = BackendType::parse(&backend_name)?;

        let api_url = match lookup("PESTEL_LLM_API_URL") {
            Some(url) => url,
            None if backend_type == BackendType::Ollama => DEFAULT_OLLAMA_URL.to_owned(),
            None => return Err(missing("PESTEL_LLM_API_URL")),
        };
        let api_key = match lookup("PESTEL_LLM_API_KEY") {
            Some(key) => key,
            None if !backend_type.requires_key() => String::new(),
            None => return Err(missing("PESTEL_LLM_API_KEY")),
        };
        let model = lookup("PESTEL_LLM_MODEL").ok_or_else(|| missing("PESTEL_LLM_MODEL"))?;

        let retries: u32 = parsed(&lookup, "PESTEL_ORACLE_RETRIES", 2)?;
        let backoff_ms: u64 = parsed(&lookup, "PESTEL_ORACLE_BACKOFF_MS", 250)?;
        let cache_enabled: bool = parsed(&lookup, "PESTEL_ORACLE_CACHE", true)?;
        let cache_capacity: usize = parsed(&lookup, "PESTEL_ORACLE_CACHE_CAPACITY", 1024)?;
        let templates_dir = lookup("PESTEL_TEMPLATES_DIR").map(PathBuf::from);

        Ok(Some(Self {
            backend: LlmBackendConfig {
                backend_type,
                api_url: api_url.trim_end_matches('/').to_owned(),
                api_key,
                model,
            },
            retries,
            backoff: Duration::from_millis(backoff_ms),
            cache_enabled,
            cache_capacity,
            templates_dir,
        }))
    }
}

fn missing(name: &str) -> OracleServiceError {
    OracleServiceError::config(format!("missing required env var {name}"))
}

/// Parse an optional variable, falling back to `default` when unset.
fn parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, OracleServiceError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e| OracleServiceError::config(format!("invalid {name}: {e}")))
    })
}
