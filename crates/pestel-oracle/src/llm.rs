//! LLM backend abstraction and implementations.
//!
//! Enum dispatch over the supported HTTP protocols, since async methods are
//! not dyn-compatible. Every backend takes a rendered prompt and returns the
//! raw response text; parsing happens elsewhere.

use crate::config::{BackendType, LlmBackendConfig};
use crate::error::OracleServiceError;
use crate::prompt::RenderedPrompt;

/// Sampling temperature sent with every request.
const TEMPERATURE: f64 = 0.7;

/// Response length cap. Protocol answers are a single line.
const MAX_TOKENS: u32 = 256;

// Dispatch.

/// An LLM backend that can complete a prompt.
pub enum LlmBackend {
    /// OpenAI-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
    /// Ollama native generate API.
    Ollama(OllamaBackend),
}

impl LlmBackend {
    /// Send a prompt and return the response text.
    ///
    /// # Errors
    ///
    /// Returns [`OracleServiceError::Backend`] if the HTTP call fails or the
    /// response text cannot be extracted.
    pub async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, OracleServiceError> {
        match self {
            Self::OpenAi(backend) => backend.complete(prompt).await,
            Self::Anthropic(backend) => backend.complete(prompt).await,
            Self::Ollama(backend) => backend.complete(prompt).await,
        }
    }

    /// Check the backend is reachable before a run starts.
    ///
    /// # Errors
    ///
    /// Returns [`OracleServiceError::Backend`] if the endpoint does not
    /// answer with a success status.
    pub async fn check_reachable(&self) -> Result<(), OracleServiceError> {
        let request = match self {
            Self::OpenAi(b) => b
                .http
                .client
                .get(format!("{}/models", b.http.api_url))
                .bearer_auth(&b.http.api_key),
            Self::Anthropic(b) => b
                .http
                .client
                .get(format!("{}/models", b.http.api_url))
                .header("x-api-key", &b.http.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            Self::Ollama(b) => b.http.client.get(format!("{}/api/tags", b.http.api_url)),
        };
        let response = request
            .send()
            .await
            .map_err(|e| {
                OracleServiceError::backend(format!("{} reachability check: {e}", self.name()))
            })?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(OracleServiceError::backend(format!(
                "{} reachability check returned {status}",
                self.name()
            )))
        }
    }

    /// Human-readable name for logs and the run report.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
            Self::Ollama(_) => "ollama",
        }
    }

    /// Model identifier requests are sent with.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAi(b) => &b.http.model,
            Self::Anthropic(b) => &b.http.model,
            Self::Ollama(b) => &b.http.model,
        }
    }
}

/// Connection details shared by every backend.
struct HttpTarget {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl HttpTarget {
    fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// POST `body` to `request` and return the JSON answer.
    async fn send_json(
        &self,
        backend: &str,
        request: reqwest::RequestBuilder,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, OracleServiceError> {
        let response = request
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| OracleServiceError::backend(format!("{backend} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(OracleServiceError::backend(format!(
                "{backend} returned {status}: {error_body}"
            )));
        }

        response.json().await.map_err(|e| {
            OracleServiceError::backend(format!("{backend} response parse failed: {e}"))
        })
    }
}

// POST {api_url}/chat/completions with a bearer token.

/// Backend for OpenAI-compatible chat completions APIs.
///
/// Sends requests to `{api_url}/chat/completions`.
pub struct OpenAiBackend {
    http: HttpTarget,
}

impl OpenAiBackend {
    /// Create a new OpenAI-compatible backend.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            http: HttpTarget::new(config),
        }
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, OracleServiceError> {
        let body = serde_json::json!({
            "model": self.http.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS
        });
        let request = self
            .http
            .client
            .post(format!("{}/chat/completions", self.http.api_url))
            .bearer_auth(&self.http.api_key);
        let json = self.http.send_json("OpenAI", request, &body).await?;
        chat_completion_text(&json)
    }
}

/// Text of the first choice.
fn chat_completion_text(json: &serde_json::Value) -> Result<String, OracleServiceError> {
    text_at(json, "/choices/0/message/content", "OpenAI")
}

// POST {api_url}/messages with an x-api-key header.

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Backend for the Anthropic Messages API.
///
/// The system prompt is a top-level field and authentication uses the
/// `x-api-key` header.
pub struct AnthropicBackend {
    http: HttpTarget,
}

impl AnthropicBackend {
    /// Create a new Anthropic Messages API backend.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            http: HttpTarget::new(config),
        }
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, OracleServiceError> {
        let body = serde_json::json!({
            "model": self.http.model,
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
            "system": prompt.system,
            "messages": [
                {"role": "user", "content": prompt.user}
            ]
        });
        let request = self
            .http
            .client
            .post(format!("{}/messages", self.http.api_url))
            .header("x-api-key", &self.http.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION);
        let json = self.http.send_json("Anthropic", request, &body).await?;
        messages_text(&json)
    }
}

/// Text of the first content block.
fn messages_text(json: &serde_json::Value) -> Result<String, OracleServiceError> {
    text_at(json, "/content/0/text", "Anthropic")
}

// POST {api_url}/api/generate, unauthenticated.

/// Backend for a local Ollama server's `/api/generate` endpoint.
pub struct OllamaBackend {
    http: HttpTarget,
}

impl OllamaBackend {
    /// Create a new Ollama backend.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            http: HttpTarget::new(config),
        }
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, OracleServiceError> {
        let body = serde_json::json!({
            "model": self.http.model,
            "system": prompt.system,
            "prompt": prompt.user,
            "stream": false,
            "options": {"temperature": TEMPERATURE, "num_predict": MAX_TOKENS}
        });
        let request = self
            .http
            .client
            .post(format!("{}/api/generate", self.http.api_url));
        let json = self.http.send_json("Ollama", request, &body).await?;
        generate_text(&json)
    }
}

fn generate_text(json: &serde_json::Value) -> Result<String, OracleServiceError> {
    text_at(json, "/response", "Ollama")
}

/// The string at JSON `pointer`, or a backend error naming what is missing.
fn text_at(
    json: &serde_json::Value,
    pointer: &str,
    backend: &str,
) -> Result<String, OracleServiceError> {
    json.pointer(pointer)
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| OracleServiceError::backend(format!("{backend} response has no {pointer}")))
}

// Construction from config.

/// Create an LLM backend from configuration.
pub fn create_backend(config: &LlmBackendConfig) -> LlmBackend {
    match config.backend_type {
        BackendType::OpenAi => LlmBackend::OpenAi(OpenAiBackend::new(config)),
        BackendType::Anthropic => LlmBackend::Anthropic(AnthropicBackend::new(config)),
        BackendType::Ollama => LlmBackend::Ollama(OllamaBackend::new(config)),
    }
}
